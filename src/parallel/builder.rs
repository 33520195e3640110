//! Builder API for parallel configuration.

use crate::parallel::cancel::CancellationToken;
use crate::parallel::config::ParallelConfig;

/// Builder for creating a [`ParallelConfig`]
#[derive(Debug, Default)]
pub struct ParallelBuilder {
    cancellation: Option<CancellationToken>,
    fail_fast: bool,
}

impl ParallelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a cancellation token with the batch
    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Stop starting children once one has failed
    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ParallelConfig {
        ParallelConfig {
            cancellation: self.cancellation,
            fail_fast: self.fail_fast,
        }
    }
}
