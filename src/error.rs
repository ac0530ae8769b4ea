//! Error taxonomy for the streaming client.
//!
//! - `TransportError`: anything the websocket layer reports
//! - `CodecError`: validation, protocol and data errors
//! - `SessionError`: what `Session` operations return to the caller

use std::fmt;

use thiserror::Error;

use crate::collector::SessionState;

/// Which of the four quote fields failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteField {
    AskPrice,
    AskAmount,
    BidPrice,
    BidAmount,
}

impl fmt::Display for QuoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteField::AskPrice => "ask price",
            QuoteField::AskAmount => "ask amount",
            QuoteField::BidPrice => "bid price",
            QuoteField::BidAmount => "bid amount",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connection closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(r#"invalid symbol {0:?}, symbol must be of the form "TOKEN_ASSET""#)]
    InvalidSymbol(String),

    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("invalid {field}: {value:?}")]
    InvalidNumericField { field: QuoteField, value: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to websocket")]
    Connection(#[source] TransportError),

    #[error(r#"invalid symbol {0:?}, symbol must be of the form "TOKEN_ASSET""#)]
    InvalidSymbol(String),

    #[error("failed to subscribe to {channel} channel")]
    Subscription {
        channel: String,
        #[source]
        source: TransportError,
    },

    #[error("already subscribed to {0}")]
    AlreadySubscribed(String),

    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("read loop already started")]
    ReadLoopActive,
}
