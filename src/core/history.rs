//! Bounded log of the transitions a machine has performed.
//!
//! Only state keys are recorded, never state contents. The log exists for
//! diagnostics: inspecting the path a machine took, or dumping it as JSON.

use super::key::StateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while exporting a transition log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Record of a single completed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Position of this transition in the machine's lifetime, starting at 1
    pub sequence: u64,
    /// Key of the state that was current before the transition
    pub from: StateKey,
    /// Key of the state that is current after the transition
    pub to: StateKey,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Whether the transition stayed on the same state kind.
    pub fn is_self_transition(&self) -> bool {
        self.from == self.to
    }
}

/// Ordered transition log keeping at most `capacity` records.
///
/// When full, the oldest record is evicted. A capacity of zero disables
/// recording entirely.
///
/// # Example
///
/// ```rust
/// use statewise::core::{StateKey, TransitionLog, TransitionRecord};
/// use chrono::Utc;
///
/// let mut log = TransitionLog::with_capacity(8);
/// log.record(TransitionRecord {
///     sequence: 1,
///     from: StateKey::named("Idle"),
///     to: StateKey::named("Running"),
///     timestamp: Utc::now(),
/// });
///
/// let path = log.get_path();
/// assert_eq!(path, vec![&StateKey::named("Idle"), &StateKey::named("Running")]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionLog {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl TransitionLog {
    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Append a record, evicting the oldest one when the log is full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Keys visited by the retained records: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&StateKey> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(&first.from);
        }
        path.extend(self.records.iter().map(|record| &record.to));
        path
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time between the first and last retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Render the log as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn record(sequence: u64, from: &'static str, to: &'static str) -> TransitionRecord {
        TransitionRecord {
            sequence,
            from: StateKey::named(from),
            to: StateKey::named(to),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn disabled_log_records_nothing() {
        let mut log = TransitionLog::disabled();
        log.record(record(1, "A", "B"));
        assert!(!log.is_enabled());
        assert!(log.is_empty());
        assert!(log.get_path().is_empty());
    }

    #[test]
    fn path_follows_recorded_transitions() {
        let mut log = TransitionLog::with_capacity(4);
        log.record(record(1, "A", "B"));
        log.record(record(2, "B", "C"));

        let path: Vec<_> = log.get_path().into_iter().map(|k| k.as_str()).collect();
        assert_eq!(path, vec!["A", "B", "C"]);
        assert_eq!(log.last().unwrap().sequence, 2);
    }

    #[test]
    fn full_log_evicts_oldest_record() {
        let mut log = TransitionLog::with_capacity(2);
        log.record(record(1, "A", "B"));
        log.record(record(2, "B", "C"));
        log.record(record(3, "C", "A"));

        assert_eq!(log.len(), 2);
        let sequences: Vec<_> = log.records().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![2, 3]);
        assert_eq!(log.get_path()[0].as_str(), "B");
    }

    #[test]
    fn self_transition_is_detected() {
        assert!(record(1, "A", "A").is_self_transition());
        assert!(!record(1, "A", "B").is_self_transition());
    }

    #[test]
    fn duration_spans_first_to_last() {
        let mut log = TransitionLog::with_capacity(4);
        assert!(log.duration().is_none());

        let start = Utc::now();
        let mut first = record(1, "A", "B");
        first.timestamp = start;
        let mut second = record(2, "B", "C");
        second.timestamp = start + TimeDelta::seconds(5);
        log.record(first);
        log.record(second);

        assert_eq!(log.duration(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn json_dump_contains_keys() {
        let mut log = TransitionLog::with_capacity(4);
        log.record(record(1, "app::Idle", "app::Busy"));

        let json = log.to_json().unwrap();
        assert!(json.contains("app::Idle"));
        assert!(json.contains("app::Busy"));

        let back: TransitionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.records().collect::<Vec<_>>(), log.records().collect::<Vec<_>>());
    }
}
