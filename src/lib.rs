//! Catena: composable chains with deferred effects
//!
//! Catena follows the "pure core, imperative shell" split. A [`Chain`] is a
//! pure value: binding steps composes state transitions, queues effects and
//! checks contracts without performing anything. Running a chain hands back
//! an [`Outcome`] whose effects the caller performs when it chooses.
//!
//! # Core Concepts
//!
//! - **Chain**: value, dependency context, state transform, effect queue and
//!   contract, with a sticky terminal error
//! - **Contract**: predicate the value must satisfy before every bind and at run
//! - **Effect**: deferred, described action; performed only on request
//! - **Future**: one-shot background result that can be lifted into a chain
//! - **Parallel**: fan-out of independent chains with ordered fan-in
//! - **Registry**: typed capability map, usable as a dependency context
//!
//! # Example
//!
//! ```rust
//! use catena::{parallel, Chain, Effect, Future, StateLayer};
//!
//! let price = Future::spawn(|| Ok::<_, std::io::Error>(20));
//!
//! let quote = Chain::from_future(&price, ())
//!     .with_contract(|p: &i32| *p > 0)
//!     .bind(|p, deps| Chain::new(p * 2, *deps).with_effect(Effect::log("Doubled price")));
//!
//! let batch = parallel(vec![quote, Chain::new(5, ())], ())
//!     .with_state(|s: StateLayer| s.increment());
//!
//! let outcome = batch.run(StateLayer::new(0));
//!
//! assert_eq!(outcome.value, vec![40, 5]);
//! assert_eq!(outcome.state.counter(), 1);
//! assert_eq!(
//!     outcome.effect_descriptions(),
//!     vec!["Doubled price", "Parallel execution succeeded"]
//! );
//!
//! let (journal, result) = outcome.perform_effects();
//! assert!(result.is_success());
//! assert_eq!(journal.len(), 2);
//! ```

pub mod chain;
pub mod core;
pub mod effects;
pub mod future;
pub mod parallel;
pub mod registry;

// Re-export commonly used types
pub use chain::{BoxError, Chain, ChainError, Outcome};
pub use core::{Contract, Counter, StateLayer};
pub use effects::{perform_all, Effect, EffectError, EffectJournal, EffectRecord};
pub use future::{Future, FutureError, Resolved};
pub use parallel::{
    parallel, parallel_with, CancellationToken, ParallelBuilder, ParallelConfig,
};
pub use registry::{Key, Registry, RegistryError};
