//! Deferred effect actions.

use crate::chain::BoxError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Errors reported when an effect is performed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("Effect '{effect}' failed: {message}")]
    Failed { effect: String, message: String },

    #[error("Effect '{effect}' panicked: {message}")]
    Panicked { effect: String, message: String },
}

/// Type alias for effect action functions.
pub type EffectAction = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// A deferred, zero-argument side effect.
///
/// Effects are queued while a chain is built and handed back by
/// [`Chain::run`](crate::Chain::run). Queuing never executes anything;
/// the caller decides when to [`perform`](Effect::perform) them.
///
/// Every effect carries a description so queues can be inspected
/// without running them.
#[derive(Clone)]
pub struct Effect {
    description: String,
    action: EffectAction,
}

impl Effect {
    /// Create an effect from a description and a fallible action.
    pub fn new<F, E>(description: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            description: description.into(),
            action: Arc::new(move || action().map_err(Into::into)),
        }
    }

    /// An effect that emits `message` at info level when performed.
    ///
    /// ```rust
    /// use catena::Effect;
    ///
    /// let effect = Effect::log("Added 10 to the value");
    /// assert_eq!(effect.description(), "Added 10 to the value");
    /// assert!(effect.perform().is_ok());
    /// ```
    pub fn log(message: impl Into<String>) -> Self {
        let message = message.into();
        let text = message.clone();
        Self {
            description: message,
            action: Arc::new(move || {
                tracing::info!(target: "catena::effect", "{text}");
                Ok(())
            }),
        }
    }

    /// An effect that emits `message` at warn level when performed.
    pub fn warn(message: impl Into<String>) -> Self {
        let message = message.into();
        let text = message.clone();
        Self {
            description: message,
            action: Arc::new(move || {
                tracing::warn!(target: "catena::effect", "{text}");
                Ok(())
            }),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Execute the effect.
    ///
    /// A panicking action is caught and reported as
    /// [`EffectError::Panicked`].
    pub fn perform(&self) -> Result<(), EffectError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.action)())) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(EffectError::Failed {
                effect: self.description.clone(),
                message: source.to_string(),
            }),
            Err(payload) => Err(EffectError::Panicked {
                effect: self.description.clone(),
                message: panic_message(&*payload),
            }),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
