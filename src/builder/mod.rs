//! Builder API for two-phase state machine construction.
//!
//! The builder collects state factories, creates the machine shell, hands a
//! back-reference to every factory, then validates and registers the
//! produced states before selecting the initial one.

pub mod error;
pub mod machine;
pub mod macros;
pub mod policy;

pub use error::BuildError;
pub use machine::{StateFactory, StateMachineBuilder};
pub use policy::DuplicatePolicy;

use crate::core::State;
use crate::runtime::MachineRef;
use std::sync::Arc;

/// Box a factory for a state that never needs its machine.
///
/// # Example
///
/// ```
/// use statewise::builder::{stateless, StateFactory};
/// use statewise::core::State;
/// use std::sync::Arc;
///
/// trait Light: State {}
///
/// struct Red;
/// impl State for Red {}
/// impl Light for Red {}
///
/// let factory: StateFactory<dyn Light> = stateless(|| Arc::new(Red) as Arc<dyn Light>);
/// ```
pub fn stateless<S, F>(make: F) -> StateFactory<S>
where
    S: State + ?Sized,
    F: FnOnce() -> Arc<S> + 'static,
{
    Box::new(move |_: MachineRef<S>| make())
}
