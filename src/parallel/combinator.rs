//! Fan-out/fan-in over independent chains.

use crate::chain::{Chain, ChainError};
use crate::effects::Effect;
use crate::parallel::config::ParallelConfig;
use rayon::prelude::*;
use tracing::debug;

/// What one child reported back to the join.
struct Branch<T> {
    value: T,
    effects: Vec<Effect>,
    error: Option<ChainError>,
}

/// Run `chains` concurrently and merge them into one chain.
///
/// Equivalent to [`parallel_with`] with the default configuration: no
/// cancellation and no fail-fast.
///
/// # Example
///
/// ```rust
/// use catena::{parallel, Chain, Effect, StateLayer};
///
/// let children = (1..=3)
///     .map(|n| Chain::new(n, ()).with_effect(Effect::log(format!("child {n}"))))
///     .collect();
///
/// let outcome = parallel(children, ()).run(StateLayer::new(0));
///
/// assert_eq!(outcome.value, vec![1, 2, 3]);
/// assert_eq!(
///     outcome.effect_descriptions(),
///     vec!["child 1", "child 2", "child 3", "Parallel execution succeeded"]
/// );
/// ```
pub fn parallel<T, D, S>(chains: Vec<Chain<T, D, S>>, deps: D) -> Chain<Vec<T>, D, S>
where
    T: Send + 'static,
    D: Send,
    S: Default + 'static,
{
    parallel_with(chains, deps, &ParallelConfig::default())
}

/// Run `chains` concurrently under `config` and merge them into one chain.
///
/// Each child runs from `S::default()`; the caller's state never reaches the
/// children and the merged chain's own state transform is the identity. A
/// child skipped by cancellation keeps its value and queued effects but its
/// state transform never runs. A child whose state transition panics fails
/// with [`ChainError::Panicked`] without disturbing its siblings.
///
/// The merged chain:
/// - holds the children's values in input order, whatever the completion
///   order
/// - queues every child's effects in input order, failed children included,
///   followed by a summary effect
/// - requires exactly one result per child
/// - fails with [`ChainError::Parallel`] for the lowest-index child that
///   failed, or [`ChainError::Cancelled`] if children were only skipped
///
/// An empty batch yields an empty, successful chain.
pub fn parallel_with<T, D, S>(
    chains: Vec<Chain<T, D, S>>,
    deps: D,
    config: &ParallelConfig,
) -> Chain<Vec<T>, D, S>
where
    T: Send + 'static,
    D: Send,
    S: Default + 'static,
{
    let expected = chains.len();
    let token = config.cancellation.clone().unwrap_or_default();
    debug!(children = expected, fail_fast = config.fail_fast, "parallel fan-out");

    let branches: Vec<Branch<T>> = chains
        .into_par_iter()
        .enumerate()
        .map(|(index, chain)| {
            if token.is_cancelled() {
                debug!(index, "parallel child skipped: batch cancelled");
                return Branch {
                    effects: chain.effects().to_vec(),
                    value: chain.into_value(),
                    error: Some(ChainError::Cancelled),
                };
            }

            let (value, effects, error) = chain.settle(S::default());
            if error.is_some() && config.fail_fast {
                debug!(index, "parallel child failed: cancelling batch");
                token.cancel();
            }
            Branch {
                value,
                effects,
                error,
            }
        })
        .collect();

    let mut values = Vec::with_capacity(expected);
    let mut effects = Vec::new();
    let mut failure = None;
    let mut cancelled = false;

    for (index, branch) in branches.into_iter().enumerate() {
        values.push(branch.value);
        effects.extend(branch.effects);
        match branch.error {
            None => {}
            Some(ChainError::Cancelled) => cancelled = true,
            Some(error) => {
                if failure.is_none() {
                    failure = Some((index, error));
                }
            }
        }
    }

    let error = match failure {
        Some((index, source)) => Some(ChainError::Parallel {
            index,
            source: Box::new(source),
        }),
        None if cancelled => Some(ChainError::Cancelled),
        None => None,
    };
    debug!(failed = error.is_some(), "parallel join");

    let summary = match &error {
        None => Effect::log("Parallel execution succeeded"),
        Some(ChainError::Parallel { source, .. }) => {
            Effect::warn(format!("Parallel execution failed: {source}"))
        }
        Some(error) => Effect::warn(format!("Parallel execution failed: {error}")),
    };

    let merged = Chain::new(values, deps)
        .with_effects(effects)
        .with_effect(summary)
        .with_contract(move |results: &Vec<T>| results.len() == expected);

    match error {
        Some(error) => merged.into_failed(error),
        None => merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateLayer;
    use crate::parallel::{CancellationToken, ParallelBuilder};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn child(n: i32, delay_ms: u64) -> Chain<i32, ()> {
        Chain::new(n, ())
            .with_state(move |s: StateLayer| {
                thread::sleep(Duration::from_millis(delay_ms));
                s
            })
            .with_effect(Effect::log(format!("child {n}")))
    }

    fn failing_child(n: i32, delay_ms: u64) -> Chain<i32, ()> {
        child(n, delay_ms).bind(move |_, deps| Chain::fail(format!("child {n} broke"), *deps))
    }

    #[test]
    fn results_keep_input_order_whatever_completes_first() {
        let outcome = parallel(vec![child(1, 40), child(2, 20), child(3, 0)], ())
            .run(StateLayer::new(0));

        assert!(outcome.is_success());
        assert_eq!(outcome.value, vec![1, 2, 3]);
        assert_eq!(
            outcome.effect_descriptions(),
            vec!["child 1", "child 2", "child 3", "Parallel execution succeeded"]
        );
    }

    #[test]
    fn first_failure_by_index_is_reported_and_effects_are_kept() {
        let chains = vec![child(1, 0), failing_child(2, 40), failing_child(3, 0)];

        let outcome = parallel(chains, ()).run(StateLayer::new(0));

        match &outcome.error {
            Some(ChainError::Parallel { index, source }) => {
                assert_eq!(*index, 1);
                assert_eq!(source.root().to_string(), "child 2 broke");
            }
            other => panic!("Expected parallel error, got {other:?}"),
        }
        assert_eq!(outcome.value, vec![1, 2, 3]);
        assert_eq!(
            outcome.effect_descriptions(),
            vec![
                "child 1",
                "child 2",
                "child 3",
                "Parallel execution failed: Error in bind: child 2 broke"
            ]
        );
    }

    #[test]
    fn empty_batch_succeeds_immediately() {
        let outcome = parallel(Vec::<Chain<i32, ()>>::new(), ()).run(StateLayer::new(0));

        assert!(outcome.is_success());
        assert!(outcome.value.is_empty());
        assert_eq!(
            outcome.effect_descriptions(),
            vec!["Parallel execution succeeded"]
        );
    }

    #[test]
    fn children_start_from_default_state() {
        let counted = Chain::new(1, ()).with_state(|s: StateLayer| s.increment());

        let merged = parallel(vec![counted], ());
        let outcome = merged.run(StateLayer::new(10));

        // The child's increment is not applied to the caller's state.
        assert_eq!(outcome.state.counter(), 10);
        assert_eq!(outcome.value, vec![1]);
    }

    #[test]
    fn cancelled_batch_skips_every_child() {
        let token = CancellationToken::new();
        token.cancel();
        let config = ParallelBuilder::new().cancel_with(token).build();

        let outcome =
            parallel_with(vec![child(1, 0), child(2, 0)], (), &config).run(StateLayer::new(0));

        assert!(matches!(outcome.error, Some(ChainError::Cancelled)));
        assert_eq!(outcome.value, vec![1, 2]);
        assert_eq!(
            outcome.effect_descriptions(),
            vec![
                "child 1",
                "child 2",
                "Parallel execution failed: Parallel execution cancelled"
            ]
        );
    }

    #[test]
    fn fail_fast_skips_children_after_a_failure() {
        let config = ParallelBuilder::new().fail_fast(true).build();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();

        let outcome = pool.install(|| {
            parallel_with(
                vec![failing_child(1, 0), child(2, 0), child(3, 0)],
                (),
                &config,
            )
        });
        let outcome = outcome.run(StateLayer::new(0));

        match &outcome.error {
            Some(ChainError::Parallel { index, .. }) => assert_eq!(*index, 0),
            other => panic!("Expected parallel error, got {other:?}"),
        }
        assert_eq!(
            outcome.effect_descriptions(),
            vec![
                "child 1",
                "child 2",
                "child 3",
                "Parallel execution failed: Error in bind: child 1 broke"
            ]
        );
    }

    #[test]
    fn skipped_children_do_not_run_state_transitions() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let skipped = Chain::new(2, ())
            .with_state(move |s: StateLayer| {
                flag.store(true, Ordering::SeqCst);
                s
            })
            .with_effect(Effect::log("child 2"));

        let config = ParallelBuilder::new().fail_fast(true).build();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();

        let outcome = pool
            .install(|| {
                parallel_with(
                    vec![
                        Chain::fail("boom", ()).with_effect(Effect::log("child 1")),
                        skipped,
                    ],
                    (),
                    &config,
                )
            })
            .run(StateLayer::new(0));

        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(
            outcome.effect_descriptions(),
            vec!["child 1", "child 2", "Parallel execution failed: boom"]
        );
    }

    #[test]
    fn panicking_child_fails_alone() {
        let exploding = Chain::new(2, ())
            .with_effect(Effect::log("child 2"))
            .with_state(|_: StateLayer| panic!("state exploded"));

        let outcome = parallel(vec![child(1, 0), exploding, child(3, 0)], ())
            .run(StateLayer::new(0));

        match &outcome.error {
            Some(ChainError::Parallel { index, source }) => {
                assert_eq!(*index, 1);
                assert!(matches!(**source, ChainError::Panicked(ref m) if m == "state exploded"));
            }
            other => panic!("Expected parallel error, got {other:?}"),
        }
        assert_eq!(outcome.value, vec![1, 2, 3]);
        assert_eq!(
            outcome.effect_descriptions(),
            vec![
                "child 1",
                "child 2",
                "child 3",
                "Parallel execution failed: Chain panicked: state exploded"
            ]
        );
    }

    #[test]
    fn merged_chain_keeps_binding() {
        let outcome = parallel(vec![child(1, 0), child(2, 0)], ())
            .bind(|values, deps| Chain::new(values.iter().map(|n| n * 10).collect(), *deps))
            .run(StateLayer::new(0));

        assert_eq!(outcome.value, vec![10, 20]);
        assert!(outcome.is_success());
    }
}
