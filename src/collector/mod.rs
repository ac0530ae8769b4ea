/// Collector module
///
/// This module groups all logic responsible for:
/// - The streaming session lifecycle (connect, subscribe, disconnect)
/// - The read loop turning frames into quotes
/// - The keepalive loop
///
/// Design notes:
/// - Exchange-specific wire logic MUST NOT live here (see `exchanges`)
/// - Network access goes exclusively through `transport`
mod keepalive;
mod link;
mod read_loop;
pub mod session;

pub use session::{Session, SessionState};
