//! Zone lifecycle events and their dispatcher.
//!
//! Transitions are announced as structured [`ZoneEvent`]s on a single
//! stream instead of dot-namespaced strings: listeners narrow by kind, by
//! zone name, both, or neither through a [`ZoneFilter`].

mod core;

pub use core::{Emitter, ListenerId, ViewEvent, ZoneEvent, ZoneEventKind, ZoneFilter};
