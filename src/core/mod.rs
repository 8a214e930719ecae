//! Core state machine types.
//!
//! This module contains the building blocks the runtime is assembled from:
//! - The `State` base trait every capability trait extends
//! - `StateKey`, the stable identity of a state kind
//! - The immutable `Registry` of singleton state instances
//! - The bounded `TransitionLog` used for diagnostics

mod history;
mod key;
mod registry;
mod state;

pub use history::{LogError, TransitionLog, TransitionRecord};
pub use key::{KeyError, StateKey};
pub use registry::Registry;
pub use state::State;
