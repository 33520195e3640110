//! Lifting futures into chains.

use crate::chain::{Chain, ChainError};
use crate::effects::Effect;
use crate::future::future::Future;
use tracing::debug;

impl<T, D, S> Chain<T, D, S>
where
    T: Clone + Default + Send + 'static,
    D: Clone,
    S: 'static,
{
    /// Lift a future into a chain.
    ///
    /// The chain starts from `T::default()` and binds a step that waits on
    /// the future. A resolved value becomes the chain's value. A failure does
    /// not fail the chain at lift time: the lifted chain gets an always-false
    /// contract and a warning effect describing the error, so the failure
    /// surfaces as [`ChainError::FinalContractViolation`] when the chain runs
    /// (or [`ChainError::ContractViolation`] at the next bind).
    ///
    /// # Example
    ///
    /// ```rust
    /// use catena::{Chain, Future, StateLayer};
    /// use std::time::Duration;
    ///
    /// let answer = Future::spawn(|| {
    ///     std::thread::sleep(Duration::from_millis(10));
    ///     Ok::<_, std::io::Error>(42)
    /// });
    ///
    /// let outcome = Chain::from_future(&answer, ())
    ///     .bind(|n, deps| Chain::new(n * 3, *deps))
    ///     .run(StateLayer::new(0));
    ///
    /// assert_eq!(outcome.value, 126);
    /// assert!(outcome.error.is_none());
    /// ```
    pub fn from_future(future: &Future<T>, deps: D) -> Self {
        Chain::new(T::default(), deps).bind(|_, deps| match future.wait() {
            Ok(value) => Chain::new(value, deps.clone()),
            Err(error) => {
                debug!(error = %error, "lifted future failed");
                Chain::new(T::default(), deps.clone())
                    .with_contract(|_| false)
                    .with_effect(Effect::warn(format!("Future error: {error}")))
            }
        })
    }

    /// Lift a future, failing the chain immediately if the future failed.
    ///
    /// The terminal error is `ChainError::Bind(ChainError::Future(..))`.
    pub fn from_future_or_fail(future: &Future<T>, deps: D) -> Self {
        Chain::new(T::default(), deps).bind(|_, deps| match future.wait() {
            Ok(value) => Chain::new(value, deps.clone()),
            Err(error) => {
                debug!(error = %error, "lifted future failed");
                Chain::new(T::default(), deps.clone()).into_failed(ChainError::Future(error))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BoxError;
    use crate::core::StateLayer;
    use crate::future::FutureError;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn resolved_value_flows_into_chain() {
        let future = Future::spawn(|| {
            thread::sleep(Duration::from_millis(20));
            Ok::<_, BoxError>(42)
        });

        let outcome = Chain::from_future(&future, ())
            .bind(|n, deps| Chain::new(n * 3, *deps).with_effect(Effect::log("Tripled")))
            .run(StateLayer::new(0));

        assert_eq!(outcome.value, 126);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.effect_descriptions(), vec!["Tripled"]);
    }

    #[test]
    fn failed_future_surfaces_at_run() {
        let future: Future<i32> = Future::spawn(|| Err("connection refused"));

        let chain: Chain<i32, ()> = Chain::from_future(&future, ());
        assert!(!chain.is_failed());

        let outcome = chain.run(StateLayer::new(0));
        assert!(matches!(
            outcome.error,
            Some(ChainError::FinalContractViolation)
        ));
        assert_eq!(
            outcome.effect_descriptions(),
            vec!["Future error: connection refused"]
        );
    }

    #[test]
    fn failed_future_blocks_next_bind() {
        let future = Future::<i32>::failed("boom");

        let outcome = Chain::from_future(&future, ())
            .bind(|n, deps| Chain::new(n + 1, *deps))
            .run(StateLayer::new(0));

        assert!(matches!(outcome.error, Some(ChainError::ContractViolation)));
        assert_eq!(outcome.effect_descriptions(), vec!["Future error: boom"]);
    }

    #[test]
    fn from_future_or_fail_reports_future_error() {
        let future: Future<String> = Future::spawn(|| -> Result<String, BoxError> {
            panic!("producer crashed")
        });

        let outcome = Chain::from_future_or_fail(&future, ()).run(StateLayer::new(0));

        match outcome.error {
            Some(ChainError::Bind(inner)) => match *inner {
                ChainError::Future(FutureError::Panicked(message)) => {
                    assert_eq!(message, "producer crashed");
                }
                other => panic!("Expected future error, got {other:?}"),
            },
            other => panic!("Expected bind error, got {other:?}"),
        }
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn from_future_or_fail_passes_value_through() {
        let outcome = Chain::from_future_or_fail(&Future::ready(7u64), "deps")
            .run(StateLayer::new(0));

        assert_eq!(outcome.value, 7);
        assert!(outcome.is_success());
    }
}
