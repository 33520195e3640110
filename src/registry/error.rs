//! Registry error types.

use thiserror::Error;

/// Errors that can occur when resolving a capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No capability registered under '{key}'")]
    NotFound { key: &'static str },

    /// The entry under `key` was registered with a different capability type.
    #[error("Capability '{key}' is not a {expected}")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
    },
}
