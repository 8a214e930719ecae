//! Property-based tests for the state machine runtime.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated transition and subscription sequences.

use proptest::prelude::*;
use statewise::core::{State, StateKey};
use statewise::observer::{Observer, StateChangeEvent};
use statewise::runtime::{StateMachine, TransitionError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

trait Stage: State {
    fn index(&self) -> usize;
}

struct Draft;
struct Review;
struct Published;

impl State for Draft {}
impl Stage for Draft {
    fn index(&self) -> usize {
        0
    }
}

impl State for Review {}
impl Stage for Review {
    fn index(&self) -> usize {
        1
    }
}

impl State for Published {}
impl Stage for Published {
    fn index(&self) -> usize {
        2
    }
}

fn key_for(index: usize) -> StateKey {
    match index {
        0 => StateKey::of::<Draft>(),
        1 => StateKey::of::<Review>(),
        _ => StateKey::of::<Published>(),
    }
}

fn machine(history: usize) -> StateMachine<dyn Stage> {
    StateMachine::<dyn Stage>::builder()
        .register(|_| Arc::new(Draft))
        .register(|_| Arc::new(Review))
        .register(|_| Arc::new(Published))
        .initial_state::<Draft>()
        .history(history)
        .build()
        .unwrap()
}

#[derive(Default)]
struct Collect {
    events: Mutex<Vec<StateChangeEvent<dyn Stage>>>,
}

impl Observer<dyn Stage> for Collect {
    fn next(&self, event: &StateChangeEvent<dyn Stage>) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[derive(Default)]
struct Count(AtomicUsize);

impl Observer<dyn Stage> for Count {
    fn next(&self, _event: &StateChangeEvent<dyn Stage>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Register(usize),
    Unregister(usize),
    Transition(usize),
}

prop_compose! {
    fn arbitrary_target()(index in 0..3usize) -> usize {
        index
    }
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize).prop_map(Op::Register),
        (0..3usize).prop_map(Op::Unregister),
        arbitrary_target().prop_map(Op::Transition),
    ]
}

proptest! {
    #[test]
    fn keys_are_deterministic_across_machines(index in arbitrary_target()) {
        let a = machine(0);
        let b = machine(0);
        a.transition(&key_for(index)).unwrap();
        b.transition(&key_for(index)).unwrap();

        prop_assert_eq!(a.current_key(), b.current_key());
        prop_assert_eq!(a.current_key(), key_for(index));
        prop_assert!(!Arc::ptr_eq(&a.state(), &b.state()));
    }

    #[test]
    fn transitions_land_on_the_registered_instance(
        targets in prop::collection::vec(arbitrary_target(), 1..20)
    ) {
        let machine = machine(0);
        for target in targets {
            machine.transition(&key_for(target)).unwrap();
            let registered = machine.registry().get(&key_for(target)).unwrap();
            prop_assert!(Arc::ptr_eq(&machine.state(), registered));
            prop_assert_eq!(machine.current_state().index(), target);
        }
    }

    #[test]
    fn each_transition_notifies_once_and_reports_change(
        targets in prop::collection::vec(arbitrary_target(), 1..20)
    ) {
        let machine = machine(0);
        let collect = Arc::new(Collect::default());
        machine.register_observer(collect.clone());

        let mut previous = 0;
        for target in &targets {
            machine.transition(&key_for(*target)).unwrap();
            let events = collect.events.lock().unwrap();
            let event = events.last().unwrap();
            prop_assert_eq!(event.did_change(), previous != *target);
            prop_assert_eq!(event.previous().index(), previous);
            prop_assert_eq!(event.current().index(), *target);
            previous = *target;
        }

        let events = collect.events.lock().unwrap();
        prop_assert_eq!(events.len(), targets.len());
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence()).collect();
        let expected: Vec<u64> = (1..=targets.len() as u64).collect();
        prop_assert_eq!(sequences, expected);
    }

    #[test]
    fn unknown_keys_never_move_the_machine(
        targets in prop::collection::vec(arbitrary_target(), 0..10),
        name in "[a-z]{1,12}"
    ) {
        let machine = machine(0);
        for target in targets {
            machine.transition(&key_for(target)).unwrap();
        }
        let before = machine.state();

        let unknown = StateKey::named(format!("unregistered::{name}"));
        let result = machine.transition(&unknown);

        prop_assert_eq!(result.err(), Some(TransitionError::UnknownState { key: unknown }));
        prop_assert!(Arc::ptr_eq(&before, &machine.state()));
    }

    #[test]
    fn subscriptions_follow_a_set_model(ops in prop::collection::vec(arbitrary_op(), 1..40)) {
        let machine = machine(0);
        let observers: Vec<Arc<Count>> = (0..3).map(|_| Arc::new(Count::default())).collect();
        let mut model: HashSet<usize> = HashSet::new();
        let mut expected = [0usize; 3];

        for op in ops {
            match op {
                Op::Register(i) => {
                    let first = machine.register_observer(observers[i].clone());
                    let again = machine.register_observer(observers[i].clone());
                    prop_assert!(Arc::ptr_eq(&first, &again));
                    model.insert(i);
                }
                Op::Unregister(i) => {
                    prop_assert_eq!(machine.unregister_observer(&observers[i]), model.remove(&i));
                }
                Op::Transition(target) => {
                    machine.transition(&key_for(target)).unwrap();
                    for i in &model {
                        expected[*i] += 1;
                    }
                }
            }
            prop_assert_eq!(machine.observer_count(), model.len());
        }

        for (observer, count) in observers.iter().zip(expected) {
            prop_assert_eq!(observer.0.load(Ordering::SeqCst), count);
        }
    }

    #[test]
    fn history_is_bounded_by_capacity(
        capacity in 0..8usize,
        targets in prop::collection::vec(arbitrary_target(), 0..20)
    ) {
        let machine = machine(capacity);
        for target in &targets {
            machine.transition(&key_for(*target)).unwrap();
        }

        let history = machine.history();
        prop_assert_eq!(history.len(), targets.len().min(capacity));
        if let Some(last) = history.last() {
            prop_assert_eq!(last.sequence, targets.len() as u64);
            prop_assert_eq!(&last.to, &machine.current_key());
        }
    }
}
