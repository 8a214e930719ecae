//! The state machine core: registry, current state and transition protocol.

use super::error::TransitionError;
use super::handle::{CapabilityHandle, StateHandle};
use crate::builder::StateMachineBuilder;
use crate::core::{Registry, State, StateKey, TransitionLog, TransitionRecord};
use crate::observer::{Observer, StateChangeEvent, Subscription, Subscriptions};
use chrono::Utc;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Shared machine state. Owned by [`StateMachine`] handles; states only ever
/// hold a [`Weak`] to it.
pub(crate) struct Inner<S: State + ?Sized> {
    registry: OnceLock<Registry<S>>,
    current: RwLock<Option<Arc<S>>>,
    /// Held for a whole transition round, swap through fan-out.
    round: ReentrantMutex<()>,
    subscriptions: Subscriptions<S>,
    log: Mutex<TransitionLog>,
    logging: bool,
    sequence: AtomicU64,
}

impl<S: State + ?Sized> Inner<S> {
    fn registry(&self) -> Result<&Registry<S>, TransitionError> {
        self.registry.get().ok_or(TransitionError::NotReady)
    }

    fn current(&self) -> Option<Arc<S>> {
        self.current.read().clone()
    }

    /// Registry key of the state implemented by `T`.
    fn resolve<T: State>(&self) -> Result<StateKey, TransitionError> {
        match self.registry()?.key_of::<T>() {
            Some(key) => Ok(key.clone()),
            None => {
                let key = StateKey::of::<T>();
                tracing::debug!(key = %key, "transition to unregistered state type rejected");
                Err(TransitionError::UnknownState { key })
            }
        }
    }

    fn transition(&self, key: &StateKey) -> Result<StateChangeEvent<S>, TransitionError> {
        let Some(next) = self.registry()?.get(key) else {
            tracing::debug!(key = %key, "transition to unregistered state rejected");
            return Err(TransitionError::UnknownState { key: key.clone() });
        };

        // Other threads wait for the whole round; this thread may re-enter
        // from a state or an observer.
        let _round = self.round.lock();

        let previous = {
            let mut current = self.current.write();
            let previous = current.clone().ok_or(TransitionError::NotReady)?;
            *current = Some(Arc::clone(next));
            previous
        };
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;

        if self.logging {
            let record = TransitionRecord {
                sequence,
                from: previous.key(),
                to: key.clone(),
                timestamp: Utc::now(),
            };
            self.log.lock().record(record);
        }

        let event = StateChangeEvent::with_sequence(previous, Arc::clone(next), sequence);

        tracing::debug!(
            from = event.previous().name(),
            to = event.current().name(),
            sequence = event.sequence(),
            "transition"
        );

        for observer in self.subscriptions.snapshot() {
            observer.next(&event);
        }

        Ok(event)
    }
}

/// A finite state machine over a closed set of singleton states.
///
/// `S` is the application's capability trait object (for example
/// `dyn AppState`). Cloning is cheap and every clone drives the same machine.
///
/// # Example
///
/// ```rust
/// use statewise::core::State;
/// use statewise::runtime::StateMachine;
/// use std::sync::Arc;
///
/// trait Door: State {
///     fn is_open(&self) -> bool;
/// }
///
/// struct Open;
/// struct Closed;
///
/// impl State for Open {}
/// impl Door for Open {
///     fn is_open(&self) -> bool { true }
/// }
/// impl State for Closed {}
/// impl Door for Closed {
///     fn is_open(&self) -> bool { false }
/// }
///
/// let machine = StateMachine::<dyn Door>::builder()
///     .register(|_| Arc::new(Open))
///     .register(|_| Arc::new(Closed))
///     .initial_state::<Closed>()
///     .build()
///     .unwrap();
///
/// assert!(!machine.current_state().is_open());
/// machine.transition_to::<Open>().unwrap();
/// assert!(machine.current_state().is_open());
/// ```
pub struct StateMachine<S: State + ?Sized> {
    inner: Arc<Inner<S>>,
}

impl<S: State + ?Sized> StateMachine<S> {
    /// Start building a machine.
    pub fn builder() -> StateMachineBuilder<S> {
        StateMachineBuilder::new()
    }

    /// Machine with an empty registry and no current state.
    pub(crate) fn shell(history: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: OnceLock::new(),
                current: RwLock::new(None),
                round: ReentrantMutex::new(()),
                subscriptions: Subscriptions::new(),
                log: Mutex::new(TransitionLog::with_capacity(history)),
                logging: history > 0,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Complete construction. The current state is set before the registry is
    /// published so a ready registry always implies a current state.
    pub(crate) fn install(&self, registry: Registry<S>, initial: Arc<S>) {
        *self.inner.current.write() = Some(initial);
        if self.inner.registry.set(registry).is_err() {
            tracing::warn!("state registry was already installed; keeping the first one");
        }
    }

    /// Non-owning reference for states to call back into the machine.
    pub fn downgrade(&self) -> MachineRef<S> {
        MachineRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Make the state registered under `key` current and notify observers.
    ///
    /// Targeting the state that is already current is a regular transition:
    /// observers are notified with an event whose `did_change()` is false. On
    /// error the current state is left untouched.
    pub fn transition(&self, key: &StateKey) -> Result<&Self, TransitionError> {
        self.inner.transition(key)?;
        Ok(self)
    }

    /// [`transition`](Self::transition) to the state whose type is `T`,
    /// under whatever key that state declares.
    pub fn transition_to<T: State>(&self) -> Result<&Self, TransitionError> {
        let key = self.inner.resolve::<T>()?;
        self.transition(&key)
    }

    /// The state current right now.
    pub fn current_state(&self) -> Arc<S> {
        self.inner
            .current()
            .expect("a built machine always has a current state")
    }

    /// Alias of [`current_state`](Self::current_state).
    pub fn state(&self) -> Arc<S> {
        self.current_state()
    }

    /// Key of the current state.
    pub fn current_key(&self) -> StateKey {
        self.current_state().key()
    }

    /// Whether the current state is of type `T`.
    pub fn is_in<T: State>(&self) -> bool {
        self.current_state().state_type() == TypeId::of::<T>()
    }

    /// The registry of every state, fixed at build time.
    pub fn registry(&self) -> &Registry<S> {
        self.inner
            .registry
            .get()
            .expect("a built machine always has a registry")
    }

    /// Every registered state, in registration order.
    pub fn states(&self) -> Vec<Arc<S>> {
        self.registry().states().cloned().collect()
    }

    pub fn keys(&self) -> Vec<StateKey> {
        self.registry().keys().cloned().collect()
    }

    /// Handle that forwards each call to the state current at call time.
    pub fn as_state(&self) -> StateHandle<S> {
        StateHandle::new(self.clone())
    }

    /// Like [`as_state`](Self::as_state), viewed through a narrower capability.
    pub fn as_capability<C: ?Sized>(&self, view: fn(&S) -> &C) -> CapabilityHandle<S, C> {
        CapabilityHandle::new(self.clone(), view)
    }

    /// Register `observer`, or return its existing subscription.
    pub fn register_observer(&self, observer: Arc<dyn Observer<S>>) -> Arc<Subscription<S>> {
        self.inner.subscriptions.register(self.downgrade(), observer)
    }

    /// Returns `true` if the observer was registered and has been removed.
    pub fn unregister_observer<O: ?Sized>(&self, observer: &Arc<O>) -> bool {
        let removed = self.inner.subscriptions.remove(observer);
        if removed {
            tracing::trace!("observer unregistered");
        }
        removed
    }

    pub fn is_observing<O: ?Sized>(&self, observer: &Arc<O>) -> bool {
        self.inner.subscriptions.contains(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    /// Snapshot of the transition log.
    pub fn history(&self) -> TransitionLog {
        self.inner.log.lock().clone()
    }
}

impl<S: State + ?Sized> Clone for StateMachine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State + ?Sized> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.inner.current();
        f.debug_struct("StateMachine")
            .field("current", &current.as_ref().map(|state| state.name()))
            .field("states", &self.inner.registry.get().map(Registry::len))
            .field("observers", &self.inner.subscriptions.len())
            .finish()
    }
}

/// Non-owning back-reference from a state (or subscription) to its machine.
///
/// Factories receive one while the machine is still being built. It may be
/// stored freely, but only used once construction has completed: before that
/// every operation fails with [`TransitionError::NotReady`].
pub struct MachineRef<S: State + ?Sized> {
    inner: Weak<Inner<S>>,
}

impl<S: State + ?Sized> MachineRef<S> {
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// The owning machine, once it is built and while it still exists.
    ///
    /// Returns `None` while the machine is under construction, so a factory
    /// can neither use nor keep a strong handle to a half-built machine.
    pub fn upgrade(&self) -> Option<StateMachine<S>> {
        self.machine().ok()
    }

    fn machine(&self) -> Result<StateMachine<S>, TransitionError> {
        let inner = self.inner.upgrade().ok_or(TransitionError::MachineDropped)?;
        inner.registry()?;
        Ok(StateMachine { inner })
    }

    /// Request a transition on the owning machine.
    ///
    /// Returns the machine so a state can continue with the new current state:
    /// `machine.transition_to::<Next>()?.current_state().run()`.
    pub fn transition(&self, key: &StateKey) -> Result<StateMachine<S>, TransitionError> {
        let machine = self.machine()?;
        machine.inner.transition(key)?;
        Ok(machine)
    }

    pub fn transition_to<T: State>(&self) -> Result<StateMachine<S>, TransitionError> {
        let machine = self.machine()?;
        let key = machine.inner.resolve::<T>()?;
        machine.inner.transition(&key)?;
        Ok(machine)
    }

    pub fn current_state(&self) -> Result<Arc<S>, TransitionError> {
        self.machine()?
            .inner
            .current()
            .ok_or(TransitionError::NotReady)
    }
}

impl<S: State + ?Sized> Clone for MachineRef<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: State + ?Sized> fmt::Debug for MachineRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineRef")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
