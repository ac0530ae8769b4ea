use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::metrics::{METRICS, incr};

use super::link::Link;

/// Sends a ping control frame every `period` until cancelled.
///
/// The first ping goes out one full period after start.
///
/// On a send failure the link is disconnected and the loop ends.
/// Closing the quote stream is left to the read loop, which observes
/// the cancellation.
pub(crate) async fn run(link: Arc<Link>, period: Duration, payload: Vec<u8>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = link.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let sent = tokio::select! {
            biased;
            _ = link.cancel.cancelled() => break,
            sent = link.transport.send_ping(payload.clone()) => sent,
        };

        if let Err(e) = sent {
            link.disconnect().await;
            error!("failed to ping websocket: {e}");
            return;
        }

        incr(&METRICS.pings_sent);
    }

    // Cancellation alone (session dropped) still closes the transport
    link.disconnect().await;
    debug!("keepalive loop stopped");
}
