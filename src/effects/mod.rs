//! Deferred side effects and the shell that performs them.
//!
//! Chains only ever *queue* effects. Performing them is the caller's
//! business once `run` has returned:
//!
//! - [`Effect`]: a described, zero-argument deferred action
//! - [`perform_all`]: runs a queue in order, accumulating every failure
//! - [`EffectJournal`]: timestamped record of what was performed

mod effect;
mod journal;
mod perform;

pub(crate) use effect::panic_message;
pub use effect::{Effect, EffectAction, EffectError};
pub use journal::{EffectJournal, EffectRecord};
pub use perform::perform_all;
