//! Chain error types.

use crate::future::FutureError;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error accepted from user code (steps, producers, effect actions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors a chain can carry in its terminal error slot.
///
/// Once a chain holds one of these it is failed for good: further binds are
/// no-ops and `run` reports the error.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// The current value failed its contract before a bind; the step was skipped.
    #[error("Contract violation before bind: invalid value")]
    ContractViolation,

    /// A bind step returned a chain that had already failed.
    #[error("Error in bind: {0}")]
    Bind(Box<ChainError>),

    /// The value failed the contract when the chain was run.
    #[error("Final contract violation")]
    FinalContractViolation,

    #[error("Future failed: {0}")]
    Future(#[from] FutureError),

    /// First failing branch, by index, of a parallel batch.
    #[error("Parallel branch {index} failed: {source}")]
    Parallel {
        index: usize,
        source: Box<ChainError>,
    },

    #[error("Parallel execution cancelled")]
    Cancelled,

    /// A state transition or contract panicked while a parallel child ran.
    #[error("Chain panicked: {0}")]
    Panicked(String),

    /// Error supplied by a step through `Chain::fail`.
    #[error("{0}")]
    Step(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChainError {
    /// The innermost error, with every `Bind` layer peeled off.
    pub fn root(&self) -> &ChainError {
        match self {
            ChainError::Bind(inner) => inner.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_unwraps_nested_bind_errors() {
        let error = ChainError::Bind(Box::new(ChainError::Bind(Box::new(
            ChainError::FinalContractViolation,
        ))));

        assert!(matches!(error.root(), ChainError::FinalContractViolation));
    }

    #[test]
    fn messages_describe_the_failure() {
        let step = ChainError::Step(Arc::from(BoxError::from("network down")));
        assert_eq!(
            ChainError::Bind(Box::new(step)).to_string(),
            "Error in bind: network down"
        );

        let parallel = ChainError::Parallel {
            index: 1,
            source: Box::new(ChainError::ContractViolation),
        };
        assert_eq!(
            parallel.to_string(),
            "Parallel branch 1 failed: Contract violation before bind: invalid value"
        );
    }
}
