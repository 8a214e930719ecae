//! Late-bound forwarding handles.
//!
//! A handle never caches a state. Every call looks up the machine's current
//! state at that moment, so a call that itself triggers a transition is seen
//! by the next call through the same handle.

use super::machine::StateMachine;
use crate::core::State;
use std::fmt;
use std::sync::Arc;

/// Forwards to whatever state is current at call time.
///
/// Implement the application's capability trait for `StateHandle<dyn AppState>`
/// with [`forward_state!`](crate::forward_state) to use the handle wherever the
/// capability is expected.
pub struct StateHandle<S: State + ?Sized> {
    machine: StateMachine<S>,
}

impl<S: State + ?Sized> StateHandle<S> {
    pub(crate) fn new(machine: StateMachine<S>) -> Self {
        Self { machine }
    }

    /// The state current right now.
    pub fn current(&self) -> Arc<S> {
        self.machine.current_state()
    }

    /// Run `f` against the state current right now.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.current();
        f(&state)
    }

    pub fn machine(&self) -> &StateMachine<S> {
        &self.machine
    }
}

impl<S: State + ?Sized> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self::new(self.machine.clone())
    }
}

impl<S: State + ?Sized> fmt::Debug for StateHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateHandle").field(&self.machine).finish()
    }
}

/// Forwards to the current state viewed as capability `C`.
///
/// The view is a plain function pointer, typically a trait upcast such as
/// `fn operate(s: &(dyn AppState + 'static)) -> &(dyn Operate + 'static) { s }`.
pub struct CapabilityHandle<S: State + ?Sized, C: ?Sized> {
    machine: StateMachine<S>,
    view: fn(&S) -> &C,
}

impl<S: State + ?Sized, C: ?Sized> CapabilityHandle<S, C> {
    pub(crate) fn new(machine: StateMachine<S>, view: fn(&S) -> &C) -> Self {
        Self { machine, view }
    }

    /// Run `f` against the current state's `C` capability.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let state = self.machine.current_state();
        f((self.view)(&state))
    }
}

impl<S: State + ?Sized, C: ?Sized> Clone for CapabilityHandle<S, C> {
    fn clone(&self) -> Self {
        Self::new(self.machine.clone(), self.view)
    }
}
