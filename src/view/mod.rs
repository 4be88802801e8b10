//! Generic renderable view.
//!
//! Views are the units the layout composes: named, element-backed, able
//! to re-render from a template, and announcing their own teardown on an
//! event stream the layout subscribes to.

mod core;

pub use core::{View, ViewConfig};
