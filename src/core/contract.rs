//! Contract predicates for values flowing through a chain.
//!
//! A contract is a pure boolean function that the chain's current value must
//! satisfy. Violations are reported as errors, never as panics.

use std::fmt;
use std::sync::Arc;

/// Pure predicate that a chain's current value must satisfy.
///
/// Contracts are evaluated before every bind and once more when the chain
/// runs. Cloning a contract shares the underlying predicate.
///
/// # Example
///
/// ```rust
/// use catena::core::Contract;
///
/// let non_negative = Contract::new(|n: &i32| *n >= 0);
///
/// assert!(non_negative.check(&10));
/// assert!(!non_negative.check(&-1));
/// ```
pub struct Contract<T> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: 'static> Contract<T> {
    /// Create a contract from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Contract {
            predicate: Arc::new(predicate),
        }
    }

    /// The contract every fresh chain starts with. Holds for any value.
    ///
    /// ```rust
    /// use catena::core::Contract;
    ///
    /// assert!(Contract::always().check(&"anything"));
    /// ```
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// A contract no value can satisfy.
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    /// Check whether `value` satisfies the contract.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}

impl<T> Clone for Contract<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T: 'static> Default for Contract<T> {
    fn default() -> Self {
        Self::always()
    }
}

impl<T> fmt::Debug for Contract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract").finish_non_exhaustive()
    }
}
