//! Scripted in-memory transport for session tests.
//!
//! Frames are pushed by the test through a `FeedHandle`; everything the
//! session writes is recorded. Dropping the handle (or calling `fail`)
//! makes the next `recv` fail like a broken socket.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use bbo_stream::transport::{Connector, Frame, Transport};
use bbo_stream::{SessionConfig, TransportError};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

pub const BBO_BTC: &str = r#"{"m":"bbo","symbol":"BTC/USDT","data":{"ts":1,"bid":["100.5","2"],"ask":["101.0","1.5"]}}"#;

pub fn bbo(ask: [&str; 2], bid: [&str; 2]) -> String {
    format!(
        r#"{{"m":"bbo","symbol":"BTC/USDT","data":{{"ts":1,"bid":["{}","{}"],"ask":["{}","{}"]}}}}"#,
        bid[0], bid[1], ask[0], ask[1]
    )
}

/// Config with a keepalive long enough to stay out of the way.
pub fn quiet_config() -> SessionConfig {
    SessionConfig {
        endpoint: "ws://mock.invalid/stream".to_string(),
        ping_interval_ms: 60_000,
        ..SessionConfig::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Ping(Vec<u8>),
}

pub struct ScriptedTransport {
    incoming: Mutex<mpsc::UnboundedReceiver<Result<Frame, TransportError>>>,
    closed: CancellationToken,
    sent: StdMutex<Vec<Sent>>,
    fail_text: AtomicBool,
    fail_ping: AtomicBool,
    hang_close: AtomicBool,
    close_calls: AtomicUsize,
}

pub struct FeedHandle {
    tx: mpsc::UnboundedSender<Result<Frame, TransportError>>,
}

impl FeedHandle {
    pub fn text(&self, text: impl Into<String>) {
        let _ = self.tx.send(Ok(Frame::Text(text.into())));
    }

    pub fn frame(&self, frame: Frame) {
        let _ = self.tx.send(Ok(frame));
    }

    pub fn fail(&self, reason: &str) {
        let _ = self.tx.send(Err(TransportError::Other(reason.to_string())));
    }
}

impl ScriptedTransport {
    pub fn new() -> (Arc<Self>, FeedHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            incoming: Mutex::new(rx),
            closed: CancellationToken::new(),
            sent: StdMutex::new(Vec::new()),
            fail_text: AtomicBool::new(false),
            fail_ping: AtomicBool::new(false),
            hang_close: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        });
        (transport, FeedHandle { tx })
    }

    pub fn fail_text_writes(&self) {
        self.fail_text.store(true, Ordering::SeqCst);
    }

    pub fn fail_pings(&self) {
        self.fail_ping.store(true, Ordering::SeqCst);
    }

    /// Makes `close` never complete, like a peer that stopped reading.
    pub fn hang_on_close(&self) {
        self.hang_close.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(t) => Some(t),
                Sent::Ping(_) => None,
            })
            .collect()
    }

    pub fn pings(&self) -> Vec<Vec<u8>> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Ping(p) => Some(p),
                Sent::Text(_) => None,
            })
            .collect()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(TransportError::Other("broken pipe".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Text(text));
        Ok(())
    }

    async fn send_ping(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(TransportError::Other("broken pipe".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Ping(payload));
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, TransportError> {
        let mut incoming = self.incoming.lock().await;
        tokio::select! {
            _ = self.closed.cancelled() => Err(TransportError::Closed),
            next = incoming.recv() => next.unwrap_or(Err(TransportError::Closed)),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_close.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }
        self.closed.cancel();
        Ok(())
    }
}

/// Hands out one pre-built transport, or fails every dial.
pub struct ScriptedConnector {
    transport: Option<Arc<ScriptedTransport>>,
    pub dials: AtomicUsize,
    pub last_url: StdMutex<Option<String>>,
}

impl ScriptedConnector {
    pub fn new(transport: Arc<ScriptedTransport>) -> Arc<Self> {
        Arc::new(Self {
            transport: Some(transport),
            dials: AtomicUsize::new(0),
            last_url: StdMutex::new(None),
        })
    }

    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            transport: None,
            dials: AtomicUsize::new(0),
            last_url: StdMutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>, TransportError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());

        match &self.transport {
            Some(t) => Ok(t.clone() as Arc<dyn Transport>),
            None => Err(TransportError::Other("connection refused".to_string())),
        }
    }
}

/// Waits for the next item or panics after two seconds.
pub async fn next<T>(rx: &mut mpsc::Receiver<T>) -> Option<T> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for the quote stream")
}

/// Polls `cond` every 5ms for up to two seconds.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
