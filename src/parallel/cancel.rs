//! Cooperative cancellation for parallel batches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag telling a parallel batch to stop starting children.
///
/// Children already running finish normally. Children that have not started
/// when the token is cancelled are skipped and report
/// [`ChainError::Cancelled`](crate::ChainError::Cancelled).
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
