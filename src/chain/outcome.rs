//! Result of running a chain.

use crate::chain::error::ChainError;
use crate::effects::{perform_all, Effect, EffectError, EffectJournal};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Everything a chain produces when it runs.
///
/// Value, final state and effects are always present. Success and failure
/// are told apart solely by `error`: when it is set the value and state are
/// diagnostic only, while the queued effects remain valid to perform.
#[derive(Clone, Debug)]
pub struct Outcome<T, S> {
    /// Final computed value
    pub value: T,
    /// State after applying every composed transition
    pub state: S,
    /// Deferred effects, in declaration order
    pub effects: Vec<Effect>,
    /// Terminal error, if any
    pub error: Option<ChainError>,
}

impl<T, S> Outcome<T, S> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn effect_descriptions(&self) -> Vec<&str> {
        self.effects.iter().map(Effect::description).collect()
    }

    /// Perform the queued effects in order. See [`perform_all`].
    pub fn perform_effects(&self) -> (EffectJournal, Validation<(), NonEmptyVec<EffectError>>) {
        perform_all(&self.effects)
    }

    /// The value on success, the error otherwise.
    pub fn into_result(self) -> Result<T, ChainError> {
        match self.error {
            None => Ok(self.value),
            Some(error) => Err(error),
        }
    }
}
