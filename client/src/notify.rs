//! User-visible notifications.

use std::time::Duration;

/// Shows transient notifications to the user.
pub trait Notifier: Send + Sync {
    /// Display `message` for `duration`.
    fn notify(&self, message: &str, duration: Duration);
}

/// [`Notifier`] that writes notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        tracing::info!(
            message,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "notification"
        );
    }
}
