//! Executing effect queues.
//!
//! Effects are performed in queue order and failures never stop the run:
//! every effect gets its turn and ALL failures are accumulated with
//! Stillwater's `Validation`, so the caller sees the complete picture in one
//! pass.

use crate::effects::effect::{Effect, EffectError};
use crate::effects::journal::{EffectJournal, EffectRecord};
use chrono::Utc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Perform every effect in order, accumulating all failures.
///
/// Returns the journal of what ran alongside a `Validation` that is a success
/// only when every effect succeeded.
///
/// # Example
///
/// ```rust
/// use catena::{perform_all, Effect};
///
/// let effects = vec![
///     Effect::log("first"),
///     Effect::new("second", || Err("unavailable")),
///     Effect::log("third"),
/// ];
///
/// let (journal, result) = perform_all(&effects);
///
/// assert_eq!(journal.len(), 3);
/// assert!(result.is_failure());
/// ```
pub fn perform_all(
    effects: &[Effect],
) -> (EffectJournal, Validation<(), NonEmptyVec<EffectError>>) {
    let mut records = Vec::with_capacity(effects.len());
    let mut checks: Vec<Validation<(), NonEmptyVec<EffectError>>> = Vec::new();

    for effect in effects {
        let result = effect.perform();
        records.push(EffectRecord {
            description: effect.description().to_string(),
            performed_at: Utc::now(),
            error: result.as_ref().err().map(ToString::to_string),
        });
        let check = match result {
            Ok(()) => Validation::success(()),
            Err(error) => {
                tracing::debug!(error = %error, "effect failed");
                Validation::fail(error)
            }
        };
        checks.push(check);
    }

    // Keeps every failure, in queue order
    let result = Validation::all_vec(checks).map(|_| ());
    (EffectJournal::from_records(records), result)
}
