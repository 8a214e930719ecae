//! Macros for wiring capability traits to the forwarding handle.

/// Implement a capability trait for [`StateHandle`](crate::runtime::StateHandle)
/// by forwarding every listed method to the state current at call time.
///
/// List the trait's methods by signature; each must take `&self`.
///
/// # Example
///
/// ```
/// use statewise::core::State;
/// use statewise::forward_state;
/// use statewise::runtime::StateMachine;
/// use std::sync::Arc;
///
/// pub trait Operate {
///     fn execute(&self, number: i32) -> i32;
/// }
///
/// pub trait AppState: State + Operate {}
///
/// struct Inc;
/// impl State for Inc {}
/// impl AppState for Inc {}
/// impl Operate for Inc {
///     fn execute(&self, number: i32) -> i32 {
///         number + 1
///     }
/// }
///
/// forward_state! {
///     impl Operate for dyn AppState {
///         fn execute(&self, number: i32) -> i32;
///     }
/// }
///
/// let machine = StateMachine::<dyn AppState>::builder()
///     .register(|_| Arc::new(Inc))
///     .initial_state::<Inc>()
///     .build()
///     .unwrap();
///
/// let proxy = machine.as_state();
/// assert_eq!(proxy.execute(2), 3);
/// ```
#[macro_export]
macro_rules! forward_state {
    (
        impl $capability:ident for $target:ty {
            $(
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) $(-> $ret:ty)?;
            )*
        }
    ) => {
        impl $capability for $crate::runtime::StateHandle<$target> {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)? {
                    $capability::$method(&*self.current() $(, $arg)*)
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;
    use crate::runtime::{MachineRef, StateMachine};
    use std::sync::Arc;

    trait Calculator {
        fn apply(&self, value: i64) -> i64;
        fn describe(&self) -> String;
        fn reset(&self);
    }

    trait Mode: State + Calculator {}

    struct Double;
    struct Negate {
        machine: MachineRef<dyn Mode>,
    }

    impl State for Double {}
    impl Mode for Double {}
    impl Calculator for Double {
        fn apply(&self, value: i64) -> i64 {
            value * 2
        }

        fn describe(&self) -> String {
            "double".to_string()
        }

        fn reset(&self) {}
    }

    impl State for Negate {}
    impl Mode for Negate {}
    impl Calculator for Negate {
        fn apply(&self, value: i64) -> i64 {
            -value
        }

        fn describe(&self) -> String {
            "negate".to_string()
        }

        fn reset(&self) {
            let _ = self.machine.transition_to::<Double>();
        }
    }

    forward_state! {
        impl Calculator for dyn Mode {
            fn apply(&self, value: i64) -> i64;
            fn describe(&self) -> String;
            fn reset(&self);
        }
    }

    fn takes_calculator(calculator: &dyn Calculator, value: i64) -> i64 {
        calculator.apply(value)
    }

    #[test]
    fn forwarded_methods_follow_current_state() {
        let machine = StateMachine::<dyn Mode>::builder()
            .register(|_| Arc::new(Double))
            .register(|machine| Arc::new(Negate { machine }))
            .initial_state::<Negate>()
            .build()
            .unwrap();
        let proxy = machine.as_state();

        assert_eq!(proxy.describe(), "negate");
        assert_eq!(takes_calculator(&proxy, 4), -4);

        proxy.reset();

        assert_eq!(proxy.describe(), "double");
        assert_eq!(takes_calculator(&proxy, 4), 8);
        assert!(machine.is_in::<Double>());
    }
}
