//! Traffic Light State Machine
//!
//! This example demonstrates a cyclic state machine whose states decide
//! their own successor.
//!
//! Key concepts:
//! - Singleton states holding a back-reference to the machine
//! - Transitions requested from inside state behavior
//! - A forwarding handle that always talks to the current light
//! - An observer printing every change
//!
//! Run with: cargo run --example traffic_light

use statewise::core::State;
use statewise::forward_state;
use statewise::observer::StateChangeEvent;
use statewise::runtime::{MachineRef, StateMachine};
use std::sync::Arc;

pub trait Signal {
    fn describe(&self) -> &'static str;
    fn advance(&self);
}

pub trait Light: State + Signal {}

struct Red {
    machine: MachineRef<dyn Light>,
}

struct Green {
    machine: MachineRef<dyn Light>,
}

struct Yellow {
    machine: MachineRef<dyn Light>,
}

impl State for Red {}
impl Light for Red {}
impl Signal for Red {
    fn describe(&self) -> &'static str {
        "Stop"
    }

    fn advance(&self) {
        if let Err(err) = self.machine.transition_to::<Green>() {
            eprintln!("red light stuck: {err}");
        }
    }
}

impl State for Green {}
impl Light for Green {}
impl Signal for Green {
    fn describe(&self) -> &'static str {
        "Go!"
    }

    fn advance(&self) {
        if let Err(err) = self.machine.transition_to::<Yellow>() {
            eprintln!("green light stuck: {err}");
        }
    }
}

impl State for Yellow {}
impl Light for Yellow {}
impl Signal for Yellow {
    fn describe(&self) -> &'static str {
        "Caution"
    }

    fn advance(&self) {
        if let Err(err) = self.machine.transition_to::<Red>() {
            eprintln!("yellow light stuck: {err}");
        }
    }
}

forward_state! {
    impl Signal for dyn Light {
        fn describe(&self) -> &'static str;
        fn advance(&self);
    }
}

fn main() {
    println!("=== Traffic Light State Machine ===\n");

    let machine = StateMachine::<dyn Light>::builder()
        .register(|machine| Arc::new(Red { machine }))
        .register(|machine| Arc::new(Green { machine }))
        .register(|machine| Arc::new(Yellow { machine }))
        .initial_state::<Red>()
        .history(8)
        .build()
        .unwrap();

    println!("Traffic light state machine created");
    println!("Initial state: {}\n", machine.current_state().name());

    let _subscription = machine.register_observer(Arc::new(|event: &StateChangeEvent<dyn Light>| {
        println!(
            "  [{}] {} -> {}",
            event.sequence(),
            event.previous().name(),
            event.current().name()
        );
    }));

    let light = machine.as_state();

    println!("Transition sequence:");
    for _ in 0..6 {
        light.advance();
        println!("    now showing: {}", light.describe());
    }

    println!("\nRecorded history:");
    for record in machine.history().records() {
        println!(
            "  #{} {} -> {}",
            record.sequence,
            record.from.short_name(),
            record.to.short_name()
        );
    }

    println!("\nKey Characteristics:");
    println!("- Each light is created once and reused on every cycle");
    println!("- Lights pick their successor themselves");
    println!("- The handle forwards to whichever light is current");
}
