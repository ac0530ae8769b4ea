// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:     Configuration structs loaded from JSON
// - schema:     Wire envelope and normalized quote types
// - util:       Symbol validation helpers
// - exchanges:  Exchange protocol codec
// - transport:  Websocket seam (trait + tokio-tungstenite impl)
// - collector:  Streaming session (connect, subscribe, loops)
// - error:      Error taxonomy
// - metrics:    Global runtime counters
//
pub mod config;
pub mod schema;
pub mod util;
pub mod exchanges;
pub mod transport;
pub mod collector;
pub mod error;
pub mod metrics;

pub use collector::{Session, SessionState};
pub use config::{Config, SessionConfig};
pub use error::{CodecError, QuoteField, SessionError, TransportError};
pub use schema::{BestOrderBook, Order};
