//! Builder configuration.

use serde::{Deserialize, Serialize};

/// What to do when two factories produce states with the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the build with `BuildError::DuplicateState`.
    #[default]
    Reject,

    /// Keep the state from the factory registered last, logging a warning.
    /// The replaced state keeps its original registry position.
    LastWins,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_is_default() {
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Reject);
    }

    #[test]
    fn serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&DuplicatePolicy::LastWins).unwrap(),
            "\"last_wins\""
        );
        let policy: DuplicatePolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::Reject);
    }
}
