use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::metrics::{METRICS, incr};
use crate::transport::Transport;

/// One established connection, shared by the session and its loops.
///
/// Holds the transport handle plus the cancellation token both loops
/// watch. Whoever hits a fatal error first calls `disconnect`; every
/// later call is a no-op.
pub(crate) struct Link {
    pub transport: Arc<dyn Transport>,
    pub cancel: CancellationToken,
    close_timeout: Duration,
    closed: AtomicBool,
}

impl Link {
    pub fn new(transport: Arc<dyn Transport>, close_timeout: Duration) -> Self {
        incr(&METRICS.sessions_active);
        Self {
            transport,
            cancel: CancellationToken::new(),
            close_timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stops both loops and closes the transport.
    ///
    /// Close failures are logged, never returned: the remote side may
    /// already have torn the connection down. A peer that stops reading
    /// cannot stall this past `close_timeout`.
    pub async fn disconnect(&self) {
        self.cancel.cancel();

        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("websocket connection already closed");
            return;
        }

        match tokio::time::timeout(self.close_timeout, self.transport.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to close websocket connection: {e}"),
            Err(_) => warn!(
                "closing websocket connection timed out after {:?}",
                self.close_timeout
            ),
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        METRICS.sessions_active.fetch_sub(1, Ordering::Relaxed);
    }
}
