//! Chained Transitions
//!
//! A state may hand control to another state and immediately continue
//! with it, so one call through the handle can pass through several states.
//!
//! Key concepts:
//! - `MachineRef::transition_to` returns the machine for chaining
//! - Capability views narrowing the handle to one trait
//! - Reading the transition log afterwards
//!
//! Run with: cargo run --example chained_transition

use statewise::core::State;
use statewise::forward_state;
use statewise::runtime::{MachineRef, StateMachine};
use std::sync::Arc;

pub trait Operate {
    fn execute(&self, number: i64) -> i64;
}

pub trait Label {
    fn label(&self) -> String;
}

pub trait Calc: State + Operate + Label {}

/// Increments, then stays put.
struct Increment;

/// Doubles the input and passes the result on to `Increment`.
struct Double {
    machine: MachineRef<dyn Calc>,
}

/// Entry point: routes to `Double` without touching the number.
struct Route {
    machine: MachineRef<dyn Calc>,
}

impl State for Increment {}
impl Calc for Increment {}
impl Operate for Increment {
    fn execute(&self, number: i64) -> i64 {
        number + 1
    }
}
impl Label for Increment {
    fn label(&self) -> String {
        "increment".into()
    }
}

impl State for Double {}
impl Calc for Double {}
impl Operate for Double {
    fn execute(&self, number: i64) -> i64 {
        match self.machine.transition_to::<Increment>() {
            Ok(machine) => machine.current_state().execute(number * 2),
            Err(err) => {
                eprintln!("double could not hand over: {err}");
                number * 2
            }
        }
    }
}
impl Label for Double {
    fn label(&self) -> String {
        "double".into()
    }
}

impl State for Route {}
impl Calc for Route {}
impl Operate for Route {
    fn execute(&self, number: i64) -> i64 {
        match self.machine.transition_to::<Double>() {
            Ok(machine) => machine.current_state().execute(number),
            Err(err) => {
                eprintln!("route could not hand over: {err}");
                number
            }
        }
    }
}
impl Label for Route {
    fn label(&self) -> String {
        "route".into()
    }
}

forward_state! {
    impl Operate for dyn Calc {
        fn execute(&self, number: i64) -> i64;
    }
}

fn label<'a>(state: &'a (dyn Calc + 'static)) -> &'a (dyn Label + 'static) {
    state
}

fn main() {
    println!("=== Chained Transitions ===\n");

    let machine = StateMachine::<dyn Calc>::builder()
        .register(|_| Arc::new(Increment))
        .register(|machine| Arc::new(Double { machine }))
        .register(|machine| Arc::new(Route { machine }))
        .initial_state::<Route>()
        .history(4)
        .build()
        .unwrap();

    let calc = machine.as_state();
    let labels = machine.as_capability(label);

    println!("Starting in: {}", labels.with(|state| state.label()));
    println!("execute(5) = {}", calc.execute(5));
    println!("Now in: {}\n", labels.with(|state| state.label()));

    println!("A second call stays in the final state:");
    println!("execute(5) = {}\n", calc.execute(5));

    println!("Path taken: {:?}", machine.history().get_path());
    if let Ok(json) = machine.history().to_json() {
        println!("As JSON: {json}");
    }
}
