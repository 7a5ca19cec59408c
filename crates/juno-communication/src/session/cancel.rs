//! Cooperative cancellation for blocking reads

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag checked between poll iterations of a blocking read
///
/// Clones share the flag, so another thread (e.g. a Ctrl-C handler) can
/// stop a session that is waiting on a silent device.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
