//! Minimal retained element tree.
//!
//! The layout only needs a small slice of what a real document tree
//! offers: attributes, a class list, and ordered children addressable by
//! node identity. [`Element`] models exactly that behind a cheaply
//! clonable handle.

mod core;

pub use core::Element;
