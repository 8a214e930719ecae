//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::policy::DuplicatePolicy;
use crate::core::{Registry, State, StateKey};
use crate::runtime::{MachineRef, StateMachine};
use std::any::TypeId;
use std::sync::Arc;

/// A boxed state factory, for registering factories of different closure
/// types together.
pub type StateFactory<S> = Box<dyn FnOnce(MachineRef<S>) -> Arc<S>>;

/// How the initial state was selected.
enum Initial {
    Key(StateKey),
    Type { state_type: TypeId, key: StateKey },
}

/// Builder for constructing state machines with a fluent API.
///
/// Factories receive a [`MachineRef`] to the machine under construction and
/// may keep it to request transitions later. They run once each, in
/// registration order, during [`build`](Self::build).
pub struct StateMachineBuilder<S: State + ?Sized> {
    factories: Vec<StateFactory<S>>,
    initial: Option<Initial>,
    duplicates: DuplicatePolicy,
    history: usize,
}

impl<S: State + ?Sized> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            initial: None,
            duplicates: DuplicatePolicy::default(),
            history: 0,
        }
    }

    /// Add a state factory.
    pub fn register<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(MachineRef<S>) -> Arc<S> + 'static,
    {
        self.factories.push(Box::new(factory));
        self
    }

    /// Add several boxed factories at once.
    pub fn register_all<I>(mut self, factories: I) -> Self
    where
        I: IntoIterator<Item = StateFactory<S>>,
    {
        self.factories.extend(factories);
        self
    }

    /// Add a batch of factories that may contain gaps.
    /// Returns an error naming the first missing position; nothing from the
    /// batch is registered in that case.
    pub fn try_register_all<I>(mut self, factories: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Option<StateFactory<S>>>,
    {
        let batch = factories
            .into_iter()
            .enumerate()
            .map(|(index, factory)| factory.ok_or(BuildError::MissingFactory { index }))
            .collect::<Result<Vec<_>, _>>()?;
        self.factories.extend(batch);
        Ok(self)
    }

    /// Set the key of the initial state (required).
    pub fn initial(mut self, key: impl Into<StateKey>) -> Self {
        self.initial = Some(Initial::Key(key.into()));
        self
    }

    /// Set the initial state by type (required). Matches the state of type
    /// `T` whatever key it declares.
    pub fn initial_state<T: State>(mut self) -> Self {
        self.initial = Some(Initial::Type {
            state_type: TypeId::of::<T>(),
            key: StateKey::of::<T>(),
        });
        self
    }

    /// How to treat two factories producing the same state kind.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Keep the last `limit` transitions in the machine's log (0 disables it).
    pub fn history(mut self, limit: usize) -> Self {
        self.history = limit;
        self
    }

    /// Build the state machine.
    ///
    /// The machine shell is created first with an empty registry, then every
    /// factory is invoked with a reference to it. The produced states are
    /// validated, the registry is populated, and finally the initial state is
    /// selected.
    pub fn build(self) -> Result<StateMachine<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let machine = StateMachine::shell(self.history);
        let handle = machine.downgrade();
        let states: Vec<Arc<S>> = self
            .factories
            .into_iter()
            .map(|factory| factory(handle.clone()))
            .collect();

        let keyed = states
            .into_iter()
            .map(|state| {
                let key = state.key();
                key.validate()?;
                Ok((key, state))
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let mut registry: Registry<S> = Registry::with_capacity(keyed.len());
        for (key, state) in keyed {
            if let Some(existing) = registry.get(&key) {
                if existing.state_type() != state.state_type() {
                    return Err(BuildError::KeyCollision { key });
                }
            }
            if registry.insert(key.clone(), state).is_some() {
                match self.duplicates {
                    DuplicatePolicy::Reject => return Err(BuildError::DuplicateState { key }),
                    DuplicatePolicy::LastWins => {
                        tracing::warn!(key = %key, "state registered twice; keeping the later one");
                    }
                }
            }
        }

        let current = match initial {
            Initial::Key(key) => registry.get(&key).cloned().ok_or(key),
            Initial::Type { state_type, key } => registry
                .get_type_id(state_type)
                .map(|(_, state)| Arc::clone(state))
                .ok_or(key),
        }
        .map_err(|key| BuildError::UnknownInitialState { key })?;

        tracing::debug!(
            states = registry.len(),
            initial = current.name(),
            "state machine built"
        );

        machine.install(registry, current);
        Ok(machine)
    }
}

impl<S: State + ?Sized> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
