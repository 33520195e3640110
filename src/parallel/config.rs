//! Parallel batch configuration.

use crate::parallel::cancel::CancellationToken;

/// How a parallel batch reacts to failure and cancellation.
#[derive(Clone, Debug, Default)]
pub struct ParallelConfig {
    /// Token checked before each child starts
    pub cancellation: Option<CancellationToken>,

    /// Cancel the remaining children on the first failure
    pub fail_fast: bool,
}
