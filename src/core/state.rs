//! Base trait shared by every state a machine can hold.
//!
//! Applications define their own capability trait (the methods callers invoke
//! on "whatever state is current") with [`State`] as a supertrait. The machine
//! never requires more than this from a state.

use super::key::{short_name, StateKey};
use std::any::TypeId;

/// Trait for state machine states.
///
/// Both methods are provided and derive from the concrete implementing type.
/// Called through a trait object they still report the concrete type, so two
/// instances of one kind always share a key.
///
/// # Example
///
/// ```rust
/// use statewise::core::{State, StateKey};
///
/// trait Light: State {
///     fn color(&self) -> &'static str;
/// }
///
/// struct Red;
///
/// impl State for Red {}
/// impl Light for Red {
///     fn color(&self) -> &'static str {
///         "red"
///     }
/// }
///
/// let light: &dyn Light = &Red;
/// assert_eq!(light.key(), StateKey::of::<Red>());
/// assert_eq!(light.name(), "Red");
/// ```
pub trait State: Send + Sync + 'static {
    /// Registry key identifying this state's kind.
    ///
    /// Override only to declare an explicit key; the default is the fully
    /// qualified name of the implementing type.
    fn key(&self) -> StateKey {
        StateKey::of_val(self)
    }

    /// Short display name for logging.
    fn name(&self) -> &str {
        short_name(std::any::type_name_of_val(self))
    }

    /// `TypeId` of the implementing type.
    ///
    /// Typed lookups such as `transition_to::<T>()` match on this rather than
    /// on [`key`](Self::key), so they keep working for declared keys. Not
    /// meant to be overridden.
    fn state_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}
