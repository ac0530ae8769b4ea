use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// This is the top-level configuration structure loaded from
// `config.json`.
//
// It defines:
// - The symbol to stream
// - Session settings (endpoint, channel, keepalive)
// - Optional debug configuration
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Trading pair to subscribe to, in `TOKEN_ASSET` form
    pub symbol: String,

    /// Streaming session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Seconds between metrics summaries (0 disables the reporter)
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,
}

impl Config {
    /// Reads a JSON configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let cfg = serde_json::from_str(data)?;
        Ok(cfg)
    }

    /// Whether every raw frame should be logged.
    pub fn raw_frames(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.raw.unwrap_or(false))
    }

    /// Whether debug-level logging was requested.
    pub fn debug_log(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.log.unwrap_or(false))
    }
}

// ------------------------------------------------------------
// Session configuration
// ------------------------------------------------------------
//
// Everything a session needs to know about the remote feed.
//
// Notes:
// - All values default to the public exchange feed.
// - Tests override `endpoint` to point at a local server and
//   shrink `ping_interval_ms`.
//
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// WebSocket URL of the market-data stream
    pub endpoint: String,

    /// Channel name used in subscriptions and as the envelope tag
    pub channel: String,

    /// Keepalive period in milliseconds
    pub ping_interval_ms: u64,

    /// Payload carried by every keepalive ping frame
    pub ping_payload: String,

    /// Capacity of the output channel created by `Session::quotes`
    ///
    /// When full, the read loop waits for the consumer.
    pub quote_buffer: usize,

    /// Upper bound for sending the close frame on disconnect
    pub close_timeout_ms: u64,
}

pub const DEFAULT_ENDPOINT: &str = "wss://ascendex.com/1/api/pro/v1/stream";
pub const DEFAULT_CHANNEL: &str = "bbo";
pub const DEFAULT_PING_PAYLOAD: &str = r#"{"op":"ping"}"#;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            ping_interval_ms: 10_000,
            ping_payload: DEFAULT_PING_PAYLOAD.to_string(),
            quote_buffer: 1,
            close_timeout_ms: 5_000,
        }
    }
}

impl SessionConfig {
    pub fn ping_interval(&self) -> Duration {
        // tokio intervals panic on a zero period
        Duration::from_millis(self.ping_interval_ms.max(1))
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}

fn default_metrics_interval_secs() -> u64 {
    10
}

// ------------------------------------------------------------
// Debug configuration
// ------------------------------------------------------------
//
// Optional debug flags used during development and testing.
//
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Enables raw WebSocket frame logging
    pub raw: Option<bool>,

    /// Enables debug-level logging
    pub log: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_feed_defaults() {
        let cfg = Config::from_json(r#"{ "symbol": "BTC_USDT" }"#).unwrap();

        assert_eq!(cfg.symbol, "BTC_USDT");
        assert_eq!(cfg.session, SessionConfig::default());
        assert_eq!(cfg.session.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.session.ping_interval(), Duration::from_secs(10));
        assert_eq!(cfg.session.close_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.metrics_interval_secs, 10);
        assert!(!cfg.raw_frames());
    }

    #[test]
    fn partial_session_override_keeps_other_defaults() {
        let cfg = Config::from_json(
            r#"{
                "symbol": "ETH_USDT",
                "session": { "endpoint": "ws://127.0.0.1:9001", "ping_interval_ms": 250 },
                "debug": { "raw": true }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.session.endpoint, "ws://127.0.0.1:9001");
        assert_eq!(cfg.session.ping_interval(), Duration::from_millis(250));
        assert_eq!(cfg.session.channel, DEFAULT_CHANNEL);
        assert_eq!(cfg.session.quote_buffer, 1);
        assert!(cfg.raw_frames());
        assert!(!cfg.debug_log());
    }

    #[test]
    fn missing_symbol_is_rejected() {
        assert!(Config::from_json(r#"{ "session": {} }"#).is_err());
    }

    #[test]
    fn zero_ping_interval_is_clamped() {
        let session = SessionConfig {
            ping_interval_ms: 0,
            ..SessionConfig::default()
        };
        assert_eq!(session.ping_interval(), Duration::from_millis(1));
    }
}
