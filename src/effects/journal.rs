//! Journal of performed effects.
//!
//! Provides an immutable, timestamped record of effects executed by the
//! caller after a chain has run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single performed effect.
///
/// # Example
///
/// ```rust
/// use catena::effects::EffectRecord;
/// use chrono::Utc;
///
/// let record = EffectRecord {
///     description: "Fetched data".to_string(),
///     performed_at: Utc::now(),
///     error: None,
/// };
/// assert!(record.succeeded());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Description of the effect that ran
    pub description: String,
    /// When the effect finished
    pub performed_at: DateTime<Utc>,
    /// Failure message, if the effect failed
    pub error: Option<String>,
}

impl EffectRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered journal of performed effects.
///
/// The journal is immutable - `record` returns a new journal with the entry
/// added and leaves the original untouched.
///
/// # Example
///
/// ```rust
/// use catena::effects::{EffectJournal, EffectRecord};
/// use chrono::Utc;
///
/// let journal = EffectJournal::new();
/// let journal = journal.record(EffectRecord {
///     description: "first".to_string(),
///     performed_at: Utc::now(),
///     error: None,
/// });
/// let journal = journal.record(EffectRecord {
///     description: "second".to_string(),
///     performed_at: Utc::now(),
///     error: Some("failed".to_string()),
/// });
///
/// assert_eq!(journal.descriptions(), vec!["first", "second"]);
/// assert_eq!(journal.failures().count(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectJournal {
    records: Vec<EffectRecord>,
}

impl EffectJournal {
    /// Create a new empty journal.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn from_records(records: Vec<EffectRecord>) -> Self {
        Self { records }
    }

    /// Record a performed effect, returning a new journal.
    ///
    /// This is a pure function - it does not mutate the existing journal.
    pub fn record(&self, record: EffectRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// All records, in the order the effects were performed.
    pub fn records(&self) -> &[EffectRecord] {
        &self.records
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.description.as_str())
            .collect()
    }

    /// Records of effects that failed.
    pub fn failures(&self) -> impl Iterator<Item = &EffectRecord> {
        self.records.iter().filter(|record| !record.succeeded())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time between the first and last performed effect.
    ///
    /// Returns `None` for an empty journal.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.performed_at.signed_duration_since(first.performed_at);
            duration.to_std().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: &str, error: Option<&str>) -> EffectRecord {
        EffectRecord {
            description: description.to_string(),
            performed_at: Utc::now(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn new_journal_is_empty() {
        let journal = EffectJournal::new();
        assert!(journal.is_empty());
        assert_eq!(journal.len(), 0);
        assert!(journal.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let journal = EffectJournal::new();
        let updated = journal.record(record("one", None));

        assert_eq!(journal.len(), 0);
        assert_eq!(updated.len(), 1);
    }

    #[test]
    fn records_preserve_order() {
        let journal = EffectJournal::new()
            .record(record("a", None))
            .record(record("b", Some("nope")))
            .record(record("c", None));

        assert_eq!(journal.descriptions(), vec!["a", "b", "c"]);
        let failed: Vec<_> = journal.failures().map(|r| r.description.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let journal = EffectJournal::new()
            .record(EffectRecord {
                description: "start".to_string(),
                performed_at: start,
                error: None,
            })
            .record(EffectRecord {
                description: "end".to_string(),
                performed_at: start + chrono::Duration::milliseconds(25),
                error: None,
            });

        assert_eq!(journal.duration(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn single_record_has_zero_duration() {
        let journal = EffectJournal::new().record(record("only", None));
        assert_eq!(journal.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn journal_serializes_correctly() {
        let journal = EffectJournal::new()
            .record(record("ok", None))
            .record(record("bad", Some("broken")));

        let json = serde_json::to_string(&journal).unwrap();
        let deserialized: EffectJournal = serde_json::from_str(&json).unwrap();

        assert_eq!(journal, deserialized);
    }
}
