// ------------------------------------------------------------
// External dependencies
// ------------------------------------------------------------

use rustls::crypto::{CryptoProvider, ring};

use bbo_stream::{Config, Session, metrics::METRICS};

use std::env;
use std::time::Duration;
use tokio::time::sleep;

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Streams best bid/offer quotes for one symbol and prints each
// quote as a JSON line on stdout.
//
// Responsibilities:
// - Initialize cryptography backend (rustls) and logging
// - Load configuration
// - Run exactly one session until the feed ends or Ctrl-C
//
// The process exits with an error when the stream ends on its
// own; restarting is left to the supervisor.
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --------------------------------------------------------
    // rustls >= 0.23 requires an explicit CryptoProvider
    // installation, once, before the first TLS handshake.
    // --------------------------------------------------------
    CryptoProvider::install_default(ring::default_provider())
        .map_err(|_| anyhow::anyhow!("failed to install rustls CryptoProvider"))?;

    let path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&path)?;

    let default_level = if config.debug_log() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // --------------------------------------------------------
    // Metrics reporter (periodic, low-noise)
    // --------------------------------------------------------
    if config.metrics_interval_secs > 0 {
        let every = Duration::from_secs(config.metrics_interval_secs);
        tokio::spawn(async move {
            loop {
                sleep(every).await;
                log::info!("[METRICS] {}", METRICS.summary());
            }
        });
    }

    let mut session = Session::new(config.session.clone()).log_raw_frames(config.raw_frames());
    session.connect().await?;
    session.subscribe(&config.symbol).await?;
    let mut quotes = session.quotes()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutdown requested");
                session.disconnect().await;
                return Ok(());
            }

            quote = quotes.recv() => match quote {
                Some(book) => println!("{}", serde_json::to_string(&book)?),
                None => {
                    session.disconnect().await;
                    anyhow::bail!("quote stream for {} ended", config.symbol);
                }
            }
        }
    }
}
