//! Closed mapping from state keys to singleton state instances.

use super::key::StateKey;
use super::state::State;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable registry of one instance per state kind.
///
/// Built once by the machine builder; afterwards only read. Iteration follows
/// the order in which states were first inserted. Entries are addressable by
/// key and by the `TypeId` of the implementing type.
pub struct Registry<S: ?Sized> {
    index: HashMap<StateKey, usize>,
    types: HashMap<TypeId, usize>,
    entries: Vec<(StateKey, Arc<S>)>,
}

impl<S: State + ?Sized> Registry<S> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            types: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a state, returning the instance it replaced under the same key.
    ///
    /// A replacement keeps the position of the original entry. A type stays
    /// indexed under the first slot it was inserted into.
    pub(crate) fn insert(&mut self, key: StateKey, state: Arc<S>) -> Option<Arc<S>> {
        let state_type = state.state_type();
        match self.index.get(&key) {
            Some(&slot) => {
                self.types.entry(state_type).or_insert(slot);
                Some(std::mem::replace(&mut self.entries[slot].1, state))
            }
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.types.entry(state_type).or_insert(slot);
                self.entries.push((key, state));
                None
            }
        }
    }

    /// Instance registered under `key`.
    pub fn get(&self, key: &StateKey) -> Option<&Arc<S>> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Key and instance of the state implemented by type `T`.
    pub fn get_type<T: State>(&self) -> Option<(&StateKey, &Arc<S>)> {
        self.get_type_id(TypeId::of::<T>())
    }

    pub(crate) fn get_type_id(&self, state_type: TypeId) -> Option<(&StateKey, &Arc<S>)> {
        self.types
            .get(&state_type)
            .map(|&slot| (&self.entries[slot].0, &self.entries[slot].1))
    }

    /// Key under which the state of type `T` is registered.
    pub fn key_of<T: State>(&self) -> Option<&StateKey> {
        self.get_type::<T>().map(|(key, _)| key)
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.index.contains_key(key)
    }

    /// Registered keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Registered instances in insertion order.
    pub fn states(&self) -> impl Iterator<Item = &Arc<S>> {
        self.entries.iter().map(|(_, state)| state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: State {}

    struct Alpha;
    struct Beta;

    impl State for Alpha {}
    impl Named for Alpha {}
    impl State for Beta {}
    impl Named for Beta {}

    fn registry() -> Registry<dyn Named> {
        let mut registry: Registry<dyn Named> = Registry::with_capacity(2);
        registry.insert(StateKey::of::<Alpha>(), Arc::new(Alpha));
        registry.insert(StateKey::of::<Beta>(), Arc::new(Beta));
        registry
    }

    #[test]
    fn lookup_by_key() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&StateKey::of::<Alpha>()));
        let beta = registry.get(&StateKey::of::<Beta>()).unwrap();
        assert_eq!(beta.name(), "Beta");
        assert!(registry.get(&StateKey::named("missing")).is_none());
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let registry = registry();
        let names: Vec<_> = registry.states().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        let keys: Vec<_> = registry.keys().cloned().collect();
        assert_eq!(keys, vec![StateKey::of::<Alpha>(), StateKey::of::<Beta>()]);
    }

    #[test]
    fn insert_under_existing_key_replaces_in_place() {
        let mut registry = registry();
        let first = Arc::clone(registry.get(&StateKey::of::<Alpha>()).unwrap());
        let replacement: Arc<dyn Named> = Arc::new(Alpha);

        let replaced = registry.insert(StateKey::of::<Alpha>(), Arc::clone(&replacement));

        assert!(Arc::ptr_eq(&replaced.unwrap(), &first));
        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(
            registry.states().next().unwrap(),
            &replacement
        ));
    }

    struct Declared;

    impl State for Declared {
        fn key(&self) -> StateKey {
            StateKey::named("named::declared")
        }
    }
    impl Named for Declared {}

    #[test]
    fn lookup_by_type_finds_declared_key() {
        let mut registry = registry();
        let declared: Arc<dyn Named> = Arc::new(Declared);
        registry.insert(declared.key(), Arc::clone(&declared));

        let (key, state) = registry.get_type::<Declared>().unwrap();
        assert_eq!(key, &StateKey::named("named::declared"));
        assert!(Arc::ptr_eq(state, &declared));
        assert_eq!(registry.key_of::<Alpha>(), Some(&StateKey::of::<Alpha>()));
        assert!(registry.get(&StateKey::of::<Declared>()).is_none());
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<dyn Named> = Registry::with_capacity(0);
        assert!(registry.is_empty());
        assert_eq!(registry.keys().count(), 0);
        assert!(registry.key_of::<Alpha>().is_none());
    }
}
