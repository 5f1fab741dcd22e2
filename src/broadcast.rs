//! Broadcast fan-out.
//!
//! Delivers one payload to every known user, sequentially, with a
//! minimum delay between sends so the whole batch stays under the
//! platform rate ceiling. One blocked or deleted recipient only bumps
//! the failure counter; it never aborts the batch.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::outbound::Outbound;
use crate::session::UserId;

/// What a broadcast delivers to each recipient
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    /// Message text, or photo caption when `media` is set
    pub text: String,
    /// Optional platform file reference for an attached photo
    pub media: Option<String>,
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    /// Recipients that accepted the payload
    pub sent: usize,
    /// Recipients whose delivery failed
    pub failed: usize,
}

/// Fixed-interval scheduler decoupled from the send call.
///
/// `pace()` returns immediately on the first call and thereafter waits
/// until at least the configured interval has passed since the previous
/// call, measured on the monotonic clock.
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    /// Create a pacer enforcing `interval` between consecutive calls
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Wait out the remainder of the interval, then mark this send slot
    pub async fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Deliver `payload` to every recipient, isolating per-recipient
/// failures and honoring `interval` between sends.
pub async fn run(
    outbound: &dyn Outbound,
    recipients: &[UserId],
    payload: &BroadcastPayload,
    interval: Duration,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    let mut pacer = Pacer::new(interval);

    for &recipient in recipients {
        pacer.pace().await;
        let result = match payload.media.as_deref() {
            Some(file_ref) => outbound.send_photo(recipient, file_ref, &payload.text).await,
            None => outbound.send_text(recipient, &payload.text).await,
        };
        match result {
            Ok(_) => report.sent += 1,
            Err(e) => {
                report.failed += 1;
                warn!("broadcast delivery to {} failed: {}", recipient, e);
            }
        }
    }

    info!(
        "broadcast finished: {} sent, {} failed of {} recipients",
        report.sent,
        report.failed,
        recipients.len()
    );
    report
}
