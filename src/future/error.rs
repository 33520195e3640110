//! Future error types.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors a [`Future`](crate::Future) can resolve with.
#[derive(Debug, Clone, Error)]
pub enum FutureError {
    /// The producer returned an error
    #[error("{0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),

    /// The producer panicked before returning
    #[error("Producer panicked: {0}")]
    Panicked(String),

    /// The producer thread could not be started
    #[error("Failed to spawn producer: {0}")]
    Spawn(String),

    /// A bounded wait expired before the future resolved
    #[error("Timed out after {0:?}")]
    TimedOut(Duration),
}
