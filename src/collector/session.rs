use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{
    config::SessionConfig,
    error::SessionError,
    exchanges::AscendexCodec,
    metrics::{METRICS, incr},
    schema::BestOrderBook,
    transport::{Connector, WsConnector},
};

use super::{keepalive, link::Link, read_loop};

/// Lifecycle of a session.
///
/// Unconnected -> Connected -> Subscribed -> Closed
///
/// `Closed` is terminal. A session reaches it through `disconnect`,
/// a failed subscription, or a fatal error in one of its loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connected,
    Subscribed,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::Connected => "connected",
            SessionState::Subscribed => "subscribed",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// A single streaming connection to the exchange feed.
///
/// Responsibilities:
/// - Connect to the configured endpoint
/// - Send exactly one bbo subscription
/// - Run the read loop (frames -> quotes) and the keepalive loop
/// - Tear everything down on `disconnect` or on fatal errors
///
/// NOT RESPONSIBLE FOR:
/// - Reconnecting. Once closed, build a new session.
///
/// The two loops run as separate tasks and share only the transport
/// and a cancellation token. `disconnect` cancels both and waits for
/// them to finish.
pub struct Session {
    config: SessionConfig,
    codec: AscendexCodec,
    connector: Arc<dyn Connector>,
    state: SessionState,
    link: Option<Arc<Link>>,
    symbol: Option<String>,
    reading: bool,
    raw_frames: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Creates an unconnected session that dials real websockets.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    pub fn with_connector(config: SessionConfig, connector: Arc<dyn Connector>) -> Self {
        let codec = AscendexCodec::new(config.channel.clone());
        Self {
            config,
            codec,
            connector,
            state: SessionState::Unconnected,
            link: None,
            symbol: None,
            reading: false,
            raw_frames: false,
            tasks: Vec::new(),
        }
    }

    /// Logs every received frame at debug level.
    pub fn log_raw_frames(mut self, enabled: bool) -> Self {
        self.raw_frames = enabled;
        self
    }

    /// Current state. Reports `Closed` as soon as a background loop
    /// has torn the connection down.
    pub fn state(&self) -> SessionState {
        match (self.state, &self.link) {
            (SessionState::Connected | SessionState::Subscribed, Some(link))
                if link.is_closed() => SessionState::Closed,
            (state, _) => state,
        }
    }

    /// The subscribed symbol, if any.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Opens the transport and starts the keepalive loop.
    ///
    /// On failure the session stays `Unconnected` and may be retried.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Unconnected => {}
            state => return Err(SessionError::InvalidState { operation: "connect", state }),
        }

        let transport = self
            .connector
            .connect(&self.config.endpoint)
            .await
            .map_err(SessionError::Connection)?;

        info!("connected to {}", self.config.endpoint);

        let link = Arc::new(Link::new(transport, self.config.close_timeout()));

        self.tasks.push(tokio::spawn(keepalive::run(
            link.clone(),
            self.config.ping_interval(),
            self.config.ping_payload.clone().into_bytes(),
        )));

        self.link = Some(link);
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Subscribes to the configured channel for `symbol` (`TOKEN_ASSET`).
    ///
    /// - Invalid symbols are rejected before anything is written.
    /// - A failed write closes the session.
    /// - Only one subscription per session.
    pub async fn subscribe(&mut self, symbol: &str) -> Result<(), SessionError> {
        let link = match (self.state(), &self.link) {
            (SessionState::Connected, Some(link)) => link.clone(),
            (SessionState::Subscribed, _) => {
                let current = self.symbol.clone().unwrap_or_default();
                return Err(SessionError::AlreadySubscribed(current));
            }
            (state, _) => return Err(SessionError::InvalidState { operation: "subscribe", state }),
        };

        let msg = self
            .codec
            .build_subscription(symbol)
            .map_err(|_| SessionError::InvalidSymbol(symbol.to_string()))?;

        if let Err(e) = link.transport.send_text(msg).await {
            incr(&METRICS.subscription_errors);
            self.shutdown().await;
            return Err(SessionError::Subscription {
                channel: self.codec.channel().to_string(),
                source: e,
            });
        }

        incr(&METRICS.subscriptions_sent);
        info!("subscribed to {}:{}", self.codec.channel(), symbol);

        self.symbol = Some(symbol.to_string());
        self.state = SessionState::Subscribed;
        Ok(())
    }

    /// Starts the read loop, delivering quotes into `sink` in arrival order.
    ///
    /// The loop waits whenever `sink` is full; nothing is dropped.
    /// When the session ends, `sink` is dropped and the consumer's
    /// receiver yields `None`.
    pub fn start_reading(&mut self, sink: mpsc::Sender<BestOrderBook>) -> Result<(), SessionError> {
        let link = match (self.state(), &self.link) {
            (SessionState::Connected | SessionState::Subscribed, Some(link)) => link.clone(),
            (state, _) => return Err(SessionError::InvalidState { operation: "read", state }),
        };

        if self.reading {
            return Err(SessionError::ReadLoopActive);
        }
        self.reading = true;

        self.tasks.push(tokio::spawn(read_loop::run(
            link,
            self.codec.clone(),
            sink,
            self.raw_frames,
        )));

        Ok(())
    }

    /// Starts the read loop on a new channel of `quote_buffer` capacity.
    pub fn quotes(&mut self) -> Result<mpsc::Receiver<BestOrderBook>, SessionError> {
        let (tx, rx) = mpsc::channel(self.config.quote_buffer.max(1));
        self.start_reading(tx)?;
        Ok(rx)
    }

    /// Closes the session from any state.
    ///
    /// Safe to call repeatedly; only the first call touches the transport.
    pub async fn disconnect(&mut self) {
        self.shutdown().await;
        info!("session closed");
    }

    async fn shutdown(&mut self) {
        if let Some(link) = &self.link {
            link.disconnect().await;
        }

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("session task failed: {e}");
            }
        }

        self.state = SessionState::Closed;
    }
}

// The loops see the cancellation and close the transport themselves.
impl Drop for Session {
    fn drop(&mut self) {
        if let Some(link) = &self.link {
            link.cancel.cancel();
        }
    }
}
