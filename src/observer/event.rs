//! Transition notifications.

use crate::core::State;
use std::fmt;
use std::sync::Arc;

/// Event describing one completed transition.
///
/// Endpoints are compared by identity: since every state kind has exactly one
/// instance per machine, `previous` and `current` being the same allocation
/// means the transition targeted the state that was already active.
pub struct StateChangeEvent<S: ?Sized> {
    previous: Arc<S>,
    current: Arc<S>,
    sequence: u64,
}

impl<S: ?Sized> StateChangeEvent<S> {
    pub fn new(previous: Arc<S>, current: Arc<S>) -> Self {
        Self::with_sequence(previous, current, 0)
    }

    pub(crate) fn with_sequence(previous: Arc<S>, current: Arc<S>, sequence: u64) -> Self {
        Self {
            previous,
            current,
            sequence,
        }
    }

    /// State that was current before the transition.
    pub fn previous(&self) -> &Arc<S> {
        &self.previous
    }

    /// State that is current after the transition.
    pub fn current(&self) -> &Arc<S> {
        &self.current
    }

    /// Position of the transition within its machine, starting at 1.
    ///
    /// Events built with [`StateChangeEvent::new`] carry sequence 0.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// False for self-transitions.
    pub fn did_change(&self) -> bool {
        !Arc::ptr_eq(&self.previous, &self.current)
    }
}

impl<S: ?Sized> Clone for StateChangeEvent<S> {
    fn clone(&self) -> Self {
        Self {
            previous: Arc::clone(&self.previous),
            current: Arc::clone(&self.current),
            sequence: self.sequence,
        }
    }
}

// Sequence numbers are bookkeeping; two events are equal when they connect the
// same instances in the same direction.
impl<S: ?Sized> PartialEq for StateChangeEvent<S> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.previous, &other.previous) && Arc::ptr_eq(&self.current, &other.current)
    }
}

impl<S: ?Sized> Eq for StateChangeEvent<S> {}

impl<S: State + ?Sized> fmt::Debug for StateChangeEvent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChangeEvent")
            .field("previous", &self.previous.name())
            .field("current", &self.current.name())
            .field("sequence", &self.sequence)
            .finish()
    }
}
