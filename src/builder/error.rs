//! Build errors for the state machine builder.

use crate::core::{KeyError, StateKey};
use thiserror::Error;

/// Errors that can occur when building a state machine.
///
/// A failed build never produces a machine; the partially built one is
/// dropped before the error is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(key) or .initial_state::<T>() before .build()")]
    MissingInitialState,

    #[error("Factory at position {index} is missing")]
    MissingFactory { index: usize },

    #[error(transparent)]
    InvalidStateType(#[from] KeyError),

    #[error("State {key} is produced by more than one factory")]
    DuplicateState { key: StateKey },

    /// Two different types produced the same key.
    #[error("State key {key} is claimed by more than one type")]
    KeyCollision { key: StateKey },

    #[error("State {key} not found")]
    UnknownInitialState { key: StateKey },
}
