//! Runtime errors.

use crate::core::StateKey;
use thiserror::Error;

/// Errors that can occur when requesting a transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("State {key} not found")]
    UnknownState { key: StateKey },

    /// The machine is still being built; its registry is not populated yet.
    #[error("State machine is not ready: construction has not completed")]
    NotReady,

    /// A state's back-reference outlived the machine that owned it.
    #[error("State machine has been dropped")]
    MachineDropped,
}
