//! The composite chain.

use crate::chain::error::{BoxError, ChainError};
use crate::chain::outcome::Outcome;
use crate::core::{Contract, StateLayer};
use crate::effects::{panic_message, Effect};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace};

/// Type alias for the composed state transform of a chain.
type Transform<S> = Arc<dyn Fn(S) -> S + Send + Sync>;

/// Whether a chain is still healthy.
///
/// A healthy chain carries the contract its value must satisfy. A failed
/// chain carries its terminal error instead and never evaluates a contract
/// again.
enum Status<T> {
    Healthy(Contract<T>),
    Failed(ChainError),
}

impl<T> Clone for Status<T> {
    fn clone(&self) -> Self {
        match self {
            Status::Healthy(contract) => Status::Healthy(contract.clone()),
            Status::Failed(error) => Status::Failed(error.clone()),
        }
    }
}

/// Chainable computation threading a value, a dependency context, a state
/// transform, a queue of deferred effects and a contract.
///
/// Chains are values: every operation consumes the chain and returns a new
/// one. Nothing is executed until [`run`](Chain::run), and even then the
/// queued effects are only handed back, never performed.
///
/// # Example
///
/// ```rust
/// use catena::{Chain, Effect, StateLayer};
///
/// let chain = Chain::new(10, ())
///     .with_contract(|n: &i32| *n >= 0)
///     .bind(|n, deps| Chain::new(n + 10, *deps).with_effect(Effect::log("Added 10 to the value")))
///     .bind(|n, deps| Chain::new(n * 2, *deps).with_effect(Effect::log("Multiplied the value by 2")));
///
/// let outcome = chain.run(StateLayer::new(0));
///
/// assert_eq!(outcome.value, 40);
/// assert!(outcome.error.is_none());
/// assert_eq!(
///     outcome.effect_descriptions(),
///     vec!["Added 10 to the value", "Multiplied the value by 2"]
/// );
/// ```
pub struct Chain<T, D, S = StateLayer> {
    value: T,
    deps: D,
    transform: Transform<S>,
    effects: Vec<Effect>,
    status: Status<T>,
}

impl<T: 'static, D, S: 'static> Chain<T, D, S> {
    /// Wrap a value and a dependency context.
    ///
    /// The fresh chain has an identity state transform, no effects, an
    /// always-true contract and no error.
    pub fn new(value: T, deps: D) -> Self {
        Self {
            value,
            deps,
            transform: Arc::new(|state: S| state),
            effects: Vec::new(),
            status: Status::Healthy(Contract::always()),
        }
    }

    /// A chain that has already failed with `error`.
    ///
    /// Steps return this to abort the rest of the chain. The value is
    /// `T::default()`.
    ///
    /// ```rust
    /// use catena::{Chain, ChainError, StateLayer};
    ///
    /// let outcome = Chain::new(1, ())
    ///     .bind(|_, deps| Chain::fail("upstream unavailable", *deps))
    ///     .run(StateLayer::new(0));
    ///
    /// assert_eq!(outcome.value, 1);
    /// assert!(matches!(outcome.error, Some(ChainError::Bind(_))));
    /// ```
    pub fn fail<E>(error: E, deps: D) -> Self
    where
        T: Default,
        E: Into<BoxError>,
    {
        Self::new(T::default(), deps).into_failed(ChainError::Step(Arc::from(error.into())))
    }

    /// Chain a step that receives the current value and dependency context.
    ///
    /// - If the chain has already failed the step is skipped and the chain
    ///   is returned unchanged.
    /// - If the current value violates the current contract the chain fails
    ///   with [`ChainError::ContractViolation`] and the step is **not**
    ///   invoked.
    /// - If the step returns a failed chain, this chain fails with
    ///   [`ChainError::Bind`]; its value, contract and effects stay as they
    ///   were before the step.
    /// - Otherwise the state transforms are composed (this chain's first),
    ///   the effect queues are concatenated (this chain's first), and the
    ///   value and contract are taken from the step's chain. The dependency
    ///   context stays this chain's.
    pub fn bind<F>(self, step: F) -> Self
    where
        F: FnOnce(&T, &D) -> Chain<T, D, S>,
    {
        let contract = match &self.status {
            Status::Failed(_) => {
                trace!("bind skipped: chain already failed");
                return self;
            }
            Status::Healthy(contract) => contract,
        };

        if !contract.check(&self.value) {
            debug!("contract violated before bind; step not invoked");
            return self.into_failed(ChainError::ContractViolation);
        }

        let next = step(&self.value, &self.deps);
        let contract = match next.status {
            Status::Failed(error) => {
                debug!(error = %error, "bind step returned a failed chain");
                return self.into_failed(ChainError::Bind(Box::new(error)));
            }
            Status::Healthy(contract) => contract,
        };

        trace!(effects = next.effects.len(), "bind step succeeded");
        let outer = self.transform;
        let inner = next.transform;
        let mut effects = self.effects;
        effects.extend(next.effects);

        Chain {
            value: next.value,
            deps: self.deps,
            transform: Arc::new(move |state: S| inner(outer(state))),
            effects,
            status: Status::Healthy(contract),
        }
    }

    /// Append an effect to the queue.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Append several effects, keeping their order.
    pub fn with_effects<I>(mut self, effects: I) -> Self
    where
        I: IntoIterator<Item = Effect>,
    {
        self.effects.extend(effects);
        self
    }

    /// Replace the contract. It is not evaluated until the next bind or run.
    ///
    /// A failed chain has no contract left to replace and is returned as is.
    pub fn with_contract<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if let Status::Healthy(contract) = &mut self.status {
            *contract = Contract::new(predicate);
        }
        self
    }

    /// Append a state transition, applied after every transition so far.
    ///
    /// ```rust
    /// use catena::{Chain, StateLayer};
    ///
    /// let outcome = Chain::new("value", ())
    ///     .with_state(|s: StateLayer| s.increment())
    ///     .with_state(|s: StateLayer| s.increment())
    ///     .run(StateLayer::new(5));
    ///
    /// assert_eq!(outcome.state.counter(), 7);
    /// ```
    pub fn with_state<F>(mut self, transition: F) -> Self
    where
        F: Fn(S) -> S + Send + Sync + 'static,
    {
        let current = self.transform;
        self.transform = Arc::new(move |state: S| transition(current(state)));
        self
    }

    /// Run the chain from `initial` state.
    ///
    /// Applies the composed state transform, then reports the terminal error
    /// if the chain failed, or [`ChainError::FinalContractViolation`] if the
    /// value fails the current contract. Value, final state and effects are
    /// returned either way.
    pub fn run(self, initial: S) -> Outcome<T, S> {
        let state = (self.transform)(initial);
        let error = match self.status {
            Status::Failed(error) => Some(error),
            Status::Healthy(contract) if contract.check(&self.value) => None,
            Status::Healthy(_) => {
                debug!("final contract violation");
                Some(ChainError::FinalContractViolation)
            }
        };

        Outcome {
            value: self.value,
            state,
            effects: self.effects,
            error,
        }
    }

    pub(crate) fn into_failed(mut self, error: ChainError) -> Self {
        self.status = Status::Failed(error);
        self
    }

    /// Run from `initial`, discarding the final state.
    ///
    /// A panicking state transition or contract is reported as
    /// [`ChainError::Panicked`]; the value and effects are returned either way.
    pub(crate) fn settle(self, initial: S) -> (T, Vec<Effect>, Option<ChainError>) {
        let Chain {
            value,
            transform,
            effects,
            status,
            ..
        } = self;

        let checked = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = transform(initial);
            match status {
                Status::Failed(error) => Some(error),
                Status::Healthy(contract) if contract.check(&value) => None,
                Status::Healthy(_) => Some(ChainError::FinalContractViolation),
            }
        }));

        let error = match checked {
            Ok(error) => error,
            Err(payload) => {
                let message = panic_message(&*payload);
                debug!(message = %message, "chain panicked while settling");
                Some(ChainError::Panicked(message))
            }
        };
        (value, effects, error)
    }
}

impl<T, D, S> Chain<T, D, S> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Effects queued so far, in insertion order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// The terminal error, if the chain has failed.
    pub fn error(&self) -> Option<&ChainError> {
        match &self.status {
            Status::Healthy(_) => None,
            Status::Failed(error) => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, Status::Failed(_))
    }

    /// Discard everything but the current value.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Clone, D: Clone, S> Clone for Chain<T, D, S> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            deps: self.deps.clone(),
            transform: Arc::clone(&self.transform),
            effects: self.effects.clone(),
            status: self.status.clone(),
        }
    }
}

impl<T: fmt::Debug, D, S> fmt::Debug for Chain<T, D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("value", &self.value)
            .field("effects", &self.effects)
            .field("error", &self.error())
            .finish_non_exhaustive()
    }
}
