//! Statewise: a finite state machine runtime for the state pattern
//!
//! A machine holds one singleton instance per state kind and dispatches to
//! exactly one of them at a time. States are plain types implementing an
//! application-defined capability trait; they may keep a back-reference to
//! their machine and request transitions from inside their own behavior.
//!
//! # Core Concepts
//!
//! - **State**: base trait for every state; its `key()` names the state kind
//! - **Builder**: two-phase construction, factories first, registry second
//! - **Transition**: swaps the current state and notifies observers
//! - **StateHandle**: forwards each call to whatever state is current now
//! - **Observer**: synchronous listener for `StateChangeEvent`s
//!
//! # Example
//!
//! ```rust
//! use statewise::core::State;
//! use statewise::forward_state;
//! use statewise::runtime::{MachineRef, StateMachine};
//! use std::sync::Arc;
//!
//! pub trait Operate {
//!     fn execute(&self, number: i32) -> i32;
//! }
//!
//! pub trait AppState: State + Operate {}
//!
//! struct Inc;
//! impl State for Inc {}
//! impl AppState for Inc {}
//! impl Operate for Inc {
//!     fn execute(&self, number: i32) -> i32 {
//!         number + 1
//!     }
//! }
//!
//! struct Transit {
//!     machine: MachineRef<dyn AppState>,
//! }
//! impl State for Transit {}
//! impl AppState for Transit {}
//! impl Operate for Transit {
//!     fn execute(&self, number: i32) -> i32 {
//!         match self.machine.transition_to::<Inc>() {
//!             Ok(machine) => machine.current_state().execute(number),
//!             Err(_) => number,
//!         }
//!     }
//! }
//!
//! forward_state! {
//!     impl Operate for dyn AppState {
//!         fn execute(&self, number: i32) -> i32;
//!     }
//! }
//!
//! let machine = StateMachine::<dyn AppState>::builder()
//!     .register(|_| Arc::new(Inc))
//!     .register(|machine| Arc::new(Transit { machine }))
//!     .initial_state::<Transit>()
//!     .build()
//!     .unwrap();
//!
//! let proxy = machine.as_state();
//! assert_eq!(proxy.execute(2), 3);
//! assert!(machine.is_in::<Inc>());
//! ```

pub mod builder;
pub mod core;
pub mod observer;
pub mod runtime;

// Re-export commonly used types
pub use crate::builder::{BuildError, DuplicatePolicy, StateMachineBuilder};
pub use crate::core::{State, StateKey};
pub use crate::observer::{Observer, StateChangeEvent, Subscription};
pub use crate::runtime::{MachineRef, StateHandle, StateMachine, TransitionError};
