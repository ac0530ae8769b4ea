//! Transport seam between the session and the network.
//!
//! The session only ever talks to `Connector` / `Transport`. The
//! production implementation wraps a tokio-tungstenite websocket;
//! tests plug in scripted transports.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::Message,
};

use crate::error::TransportError;

/// A frame received from the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
}

/// Full-duplex message connection.
///
/// THREAD SAFETY:
/// - `recv` may run concurrently with `send_text` / `send_ping`
/// - concurrent writers are serialized by the implementation
///
/// CONTRACT:
/// - `recv` returns `TransportError::Closed` once the remote side
///   closed the connection or `close` was called
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, text: String) -> Result<(), TransportError>;

    async fn send_ping(&self, payload: Vec<u8>) -> Result<(), TransportError>;

    async fn recv(&self) -> Result<Frame, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Opens transports. Injected into the session so tests can avoid
/// the network entirely.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>, TransportError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials real websocket endpoints (ws:// and wss://).
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>, TransportError> {
        let (ws, _) = connect_async(url).await?;
        Ok(Arc::new(WsTransport::new(ws)))
    }
}

/// tokio-tungstenite websocket split into independently locked halves.
///
/// Reads hold only the stream lock, writes only the sink lock, so a
/// pending `recv` never delays a ping.
pub struct WsTransport {
    write: Mutex<SplitSink<WsStream, Message>>,
    read: Mutex<SplitStream<WsStream>>,
}

impl WsTransport {
    pub fn new(ws: WsStream) -> Self {
        let (write, read) = ws.split();
        Self {
            write: Mutex::new(write),
            read: Mutex::new(read),
        }
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        let mut write = self.write.lock().await;
        write.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn send_ping(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        let mut write = self.write.lock().await;
        write.send(Message::Ping(payload.into())).await?;
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, TransportError> {
        let mut read = self.read.lock().await;

        loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Frame::Text(text.to_string())),
                Some(Ok(Message::Binary(data))) => return Ok(Frame::Binary(data.to_vec())),
                Some(Ok(Message::Ping(data))) => return Ok(Frame::Ping(data.to_vec())),
                Some(Ok(Message::Pong(data))) => return Ok(Frame::Pong(data.to_vec())),
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),

                // Raw frames are never yielded when reading messages
                Some(Ok(Message::Frame(_))) => continue,

                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut write = self.write.lock().await;
        write.close().await?;
        Ok(())
    }
}
