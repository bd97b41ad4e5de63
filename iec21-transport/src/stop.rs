//! Cooperative stop signalling for transports and sessions

use std::sync::Arc;
use tokio::sync::watch;

/// Clone-able handle that cancels pending transport reads
///
/// A stop is sticky and idempotent: once requested, `is_stopped()` stays
/// true and every pending or future `stopped()` wait resolves immediately.
/// Transports select on this token so an in-flight `read_chunk` resolves
/// with end-of-stream instead of staying suspended forever.
#[derive(Debug, Clone)]
pub struct StopToken {
    shared: Arc<watch::Sender<bool>>,
}

impl StopToken {
    /// Create a token in the not-stopped state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shared: Arc::new(tx),
        }
    }

    /// Request a stop
    ///
    /// Safe to call any number of times, from any task.
    pub fn stop(&self) {
        self.shared.send_replace(true);
    }

    /// True once a stop has been requested
    pub fn is_stopped(&self) -> bool {
        *self.shared.borrow()
    }

    /// Wait until a stop is requested
    ///
    /// `wait_for` inspects the current value before suspending, so a stop
    /// issued just before this call is never missed.
    pub async fn stopped(&self) {
        let mut rx = self.shared.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for StopToken {
    fn default() -> Self {
        Self::new()
    }
}
