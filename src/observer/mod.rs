//! Transition notifications and observer subscriptions.
//!
//! Every successful transition produces one [`StateChangeEvent`] that is
//! delivered synchronously to each registered [`Observer`] before the
//! transition call returns. Observers are identified by their `Arc`
//! allocation; registering one twice yields the same [`Subscription`].
//!
//! # Example
//!
//! ```rust
//! use statewise::observer::{Observer, StateChangeEvent};
//! use statewise::core::State;
//! use std::sync::Arc;
//!
//! struct Idle;
//! impl State for Idle {}
//!
//! let observer: Arc<dyn Observer<Idle>> = Arc::new(|event: &StateChangeEvent<Idle>| {
//!     assert!(!event.did_change());
//! });
//!
//! let idle = Arc::new(Idle);
//! observer.next(&StateChangeEvent::new(Arc::clone(&idle), idle));
//! ```

mod event;
mod subscription;

pub use event::StateChangeEvent;
pub use subscription::{Observer, Subscription};

pub(crate) use subscription::Subscriptions;
