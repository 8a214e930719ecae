//! The running state machine.
//!
//! This module provides the machine that owns the registry and the current
//! state, the back-reference states use to request transitions, and the
//! handles that forward calls to whatever state is current.
//!
//! # Key Concepts
//!
//! - **StateMachine**: shared handle; `transition` swaps the current state and
//!   notifies observers before returning
//! - **MachineRef**: non-owning handle given to state factories
//! - **StateHandle / CapabilityHandle**: late-bound forwarding, never caching
//!   a state instance
//!
//! # Concurrency
//!
//! A transition round, from the state swap through the observer fan-out, runs
//! under a per-machine reentrant lock. Rounds from different threads never
//! interleave, so every observer sees sequence numbers in increasing order.
//! The owning thread may re-enter: a state or observer can call `transition`
//! while being run, and that nested round completes before the outer one
//! resumes. An observer must not block on another thread that is itself
//! transitioning the same machine.
//!
//! Reading the current state never waits for a round to finish.

mod error;
mod handle;
mod machine;

pub use error::TransitionError;
pub use handle::{CapabilityHandle, StateHandle};
pub use machine::{MachineRef, StateMachine};
