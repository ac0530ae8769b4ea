use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

/// Global runtime metrics for the streaming client.
///
/// Purpose:
/// - Track live sessions
/// - Track throughput (frames received / quotes forwarded)
/// - Track the three error classes separately
///
/// Design:
/// - Lock-free (Atomics)
/// - Cheap to update from both session loops
#[derive(Default)]
pub struct RuntimeMetrics {
    pub sessions_active: AtomicUsize,

    // Throughput
    pub frames_received: AtomicUsize,
    pub quotes_forwarded: AtomicUsize,
    pub messages_ignored: AtomicUsize,

    // Errors
    pub quote_parse_errors: AtomicUsize,
    pub fatal_errors: AtomicUsize,

    // Outgoing
    pub pings_sent: AtomicUsize,
    pub subscriptions_sent: AtomicUsize,
    pub subscription_errors: AtomicUsize,
}

impl RuntimeMetrics {
    /// One-line summary used by the periodic reporter.
    pub fn summary(&self) -> String {
        format!(
            "sessions={} frames={} quotes={} ignored={} parse_err={} fatal={} pings={} sub_sent={} sub_err={}",
            self.sessions_active.load(Ordering::Relaxed),
            self.frames_received.load(Ordering::Relaxed),
            self.quotes_forwarded.load(Ordering::Relaxed),
            self.messages_ignored.load(Ordering::Relaxed),
            self.quote_parse_errors.load(Ordering::Relaxed),
            self.fatal_errors.load(Ordering::Relaxed),
            self.pings_sent.load(Ordering::Relaxed),
            self.subscriptions_sent.load(Ordering::Relaxed),
            self.subscription_errors.load(Ordering::Relaxed),
        )
    }
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));

#[inline]
pub(crate) fn incr(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}
