//! Immutable state carrier threaded alongside a chain's value.
//!
//! A chain never holds state directly. It accumulates a pure transform that is
//! applied to an initial snapshot when the chain runs, so every transition
//! yields a new snapshot and the old one stays untouched.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Integer types usable as a [`StateLayer`] counter.
///
/// Implemented for every primitive integer type. Incrementing saturates at
/// the type's maximum instead of overflowing.
pub trait Counter: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// The value one step after `self`.
    fn successor(self) -> Self;
}

macro_rules! impl_counter {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Counter for $ty {
                fn successor(self) -> Self {
                    self.saturating_add(1)
                }
            }
        )*
    };
}

impl_counter!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Immutable snapshot holding a single evolving counter.
///
/// `StateLayer` is the default state type of a [`Chain`](crate::Chain). Any
/// other `Clone + Send + Sync` snapshot type may be threaded instead.
///
/// # Example
///
/// ```rust
/// use catena::core::StateLayer;
///
/// let start = StateLayer::new(0u32);
/// let next = start.increment();
///
/// assert_eq!(start.counter(), 0); // Original unchanged
/// assert_eq!(next.counter(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateLayer<N = i64> {
    counter: N,
}

impl<N: Counter> StateLayer<N> {
    /// Create a snapshot with the given initial counter.
    pub fn new(initial: N) -> Self {
        Self { counter: initial }
    }

    /// Current counter value.
    pub fn counter(&self) -> N {
        self.counter
    }

    /// Return a new snapshot with the counter incremented.
    #[must_use]
    pub fn increment(&self) -> Self {
        Self {
            counter: self.counter.successor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_layer_holds_initial_counter() {
        let layer = StateLayer::new(7i64);
        assert_eq!(layer.counter(), 7);
    }

    #[test]
    fn default_layer_starts_at_zero() {
        let layer: StateLayer = StateLayer::default();
        assert_eq!(layer.counter(), 0);
    }

    #[test]
    fn increment_is_immutable() {
        let layer = StateLayer::new(1u8);
        let next = layer.increment();

        assert_eq!(layer.counter(), 1);
        assert_eq!(next.counter(), 2);
    }

    #[test]
    fn increment_chains() {
        let layer = StateLayer::new(0i32).increment().increment().increment();
        assert_eq!(layer.counter(), 3);
    }

    #[test]
    fn increment_saturates_at_maximum() {
        let layer = StateLayer::new(u8::MAX).increment();
        assert_eq!(layer.counter(), u8::MAX);
    }

    #[test]
    fn layer_serializes_correctly() {
        let layer = StateLayer::new(42u64);
        let json = serde_json::to_string(&layer).unwrap();
        assert_eq!(json, r#"{"counter":42}"#);

        let deserialized: StateLayer<u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(layer, deserialized);
    }
}
