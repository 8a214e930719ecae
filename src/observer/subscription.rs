//! Observer registration keyed by observer identity.

use super::event::StateChangeEvent;
use crate::core::State;
use crate::runtime::MachineRef;
use parking_lot::Mutex;
use std::sync::Arc;

/// Listener notified synchronously after every transition.
///
/// Closures taking `&StateChangeEvent<S>` implement this trait, so a plain
/// `Arc::new(|event| ...)` can be registered directly.
pub trait Observer<S: ?Sized>: Send + Sync {
    fn next(&self, event: &StateChangeEvent<S>);
}

impl<S: ?Sized, F> Observer<S> for F
where
    F: Fn(&StateChangeEvent<S>) + Send + Sync,
{
    fn next(&self, event: &StateChangeEvent<S>) {
        self(event)
    }
}

/// Revocable binding between one observer and one machine.
///
/// Registering the same observer twice hands back the same subscription.
pub struct Subscription<S: State + ?Sized> {
    machine: MachineRef<S>,
    observer: Arc<dyn Observer<S>>,
}

impl<S: State + ?Sized> Subscription<S> {
    /// Remove the observer from its machine.
    ///
    /// Returns `true` only for the call that actually removed it. Once the
    /// machine has been dropped this always returns `false`.
    pub fn unsubscribe(&self) -> bool {
        self.machine
            .upgrade()
            .is_some_and(|machine| machine.unregister_observer(&self.observer))
    }

    pub fn observer(&self) -> &Arc<dyn Observer<S>> {
        &self.observer
    }

    /// Whether the observer is still registered.
    pub fn is_active(&self) -> bool {
        self.machine
            .upgrade()
            .is_some_and(|machine| machine.is_observing(&self.observer))
    }
}

fn same_observer<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// The machine's subscription table, in registration order.
pub(crate) struct Subscriptions<S: State + ?Sized> {
    entries: Mutex<Vec<Arc<Subscription<S>>>>,
}

impl<S: State + ?Sized> Subscriptions<S> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Existing subscription for `observer`, or a new one bound to `machine`.
    pub(crate) fn register(
        &self,
        machine: MachineRef<S>,
        observer: Arc<dyn Observer<S>>,
    ) -> Arc<Subscription<S>> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries
            .iter()
            .find(|subscription| same_observer(&subscription.observer, &observer))
        {
            return Arc::clone(existing);
        }

        let subscription = Arc::new(Subscription { machine, observer });
        entries.push(Arc::clone(&subscription));
        subscription
    }

    pub(crate) fn remove<O: ?Sized>(&self, observer: &Arc<O>) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|subscription| !same_observer(&subscription.observer, observer));
        entries.len() != before
    }

    pub(crate) fn contains<O: ?Sized>(&self, observer: &Arc<O>) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|subscription| same_observer(&subscription.observer, observer))
    }

    /// Observers registered right now; notification iterates this copy so
    /// observers may (un)register or transition while being notified.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn Observer<S>>> {
        self.entries
            .lock()
            .iter()
            .map(|subscription| Arc::clone(&subscription.observer))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
