//! Stable identifiers for state kinds.
//!
//! A [`StateKey`] names a state *kind*, never a particular instance. By
//! default keys are derived from the concrete implementing type, so building
//! the same kind of state twice (in one machine or across machines) always
//! yields equal keys. A state may declare a fixed name instead by overriding
//! [`State::key`](crate::core::State::key).
//!
//! Derived names are readable but not guaranteed unique, and they may change
//! between compiler versions. Typed lookups therefore go through the `TypeId`
//! of the state ([`State::state_type`](crate::core::State::state_type)), and
//! the builder rejects two distinct types that end up with the same key.
//! Persist declared names, not derived ones.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Markers the compiler inserts into type names of types it generates itself.
const SYNTHETIC_MARKERS: &[&str] = &[
    "{{closure}}",
    "{{async_block}}",
    "{{async_fn_body}}",
    "{{constant}}",
    "{{opaque}}",
    "{{constructor}}",
];

/// Why a key cannot serve as a registry identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The state type has no declared name (tuples, references, slices, ...).
    #[error("Invalid state type (Anonymous) {0}")]
    Anonymous(StateKey),

    /// The state type was generated by the compiler (closures, async blocks, ...).
    #[error("Invalid state type (Synthetic) {0}")]
    Synthetic(StateKey),
}

impl KeyError {
    /// The offending key.
    pub fn key(&self) -> &StateKey {
        match self {
            Self::Anonymous(key) | Self::Synthetic(key) => key,
        }
    }
}

/// Identifier of a state kind, used as the registry lookup key.
///
/// # Example
///
/// ```rust
/// use statewise::core::StateKey;
///
/// struct Idle;
///
/// let a = StateKey::of::<Idle>();
/// let b = StateKey::of_val(&Idle);
/// assert_eq!(a, b);
/// assert_eq!(a.short_name(), "Idle");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(Cow<'static, str>);

impl StateKey {
    /// Key for the type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Key for the concrete type of `value`.
    ///
    /// Through a trait object this still names the trait object type, so
    /// states derive their key from a provided method instead (see
    /// [`State::key`](crate::core::State::key)).
    pub fn of_val<T: ?Sized>(value: &T) -> Self {
        Self(Cow::Borrowed(std::any::type_name_of_val(value)))
    }

    /// Explicitly declared key.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Full name of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the name, generics included.
    pub fn short_name(&self) -> &str {
        short_name(&self.0)
    }

    /// Check that the key is tied to a named, compiler-stable type.
    pub fn validate(&self) -> Result<(), KeyError> {
        if SYNTHETIC_MARKERS.iter().any(|marker| self.0.contains(marker)) {
            return Err(KeyError::Synthetic(self.clone()));
        }

        let name = self.as_str();
        let anonymous = !starts_with_ident(name)
            || !starts_with_ident(self.short_name())
            || STRUCTURAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix));
        if anonymous {
            return Err(KeyError::Anonymous(self.clone()));
        }

        Ok(())
    }
}

/// Type names that look like paths but denote unnamed structural types.
const STRUCTURAL_PREFIXES: &[&str] = &["dyn ", "impl ", "fn(", "unsafe ", "extern "];

fn starts_with_ident(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
}

/// Last `::` segment outside of any generic argument list.
pub(crate) fn short_name(name: &str) -> &str {
    let mut depth = 0usize;
    let mut start = 0usize;
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    &name[start..]
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey({})", self.0)
    }
}

impl From<&'static str> for StateKey {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}
