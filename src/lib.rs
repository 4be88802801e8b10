//! Zone-based view composition.
//!
//! `atrium` provides a [`Layout`] container that arranges named regions
//! ("zones") inside a single root element. Views attach into zones by
//! name, can be hidden, shown, or detached again, and every transition is
//! announced as a structured [`ZoneEvent`] on the layout's event stream.
//! A view that destroys itself is detached automatically.
//!
//! ```
//! use atrium::{Layout, View, ViewConfig, ZoneEventKind, ZoneFilter};
//!
//! let layout = Layout::new(ViewConfig::new().with_tag("div"))?;
//! layout.on(ZoneFilter::kind(ZoneEventKind::Attach), |event| {
//!     println!("mounted {}", event.zone);
//! });
//!
//! let sidebar = View::new(ViewConfig::new().with_tag("aside").with_name("sidebar"))?;
//! layout.attach(&sidebar)?;
//! layout.hide("sidebar");
//! assert!(layout.is_hidden("sidebar"));
//! # Ok::<(), atrium::LayoutError>(())
//! ```

pub mod dom;
pub mod error;
pub mod events;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod view;

pub use dom::Element;
pub use error::{LayoutError, Result};
pub use events::{Emitter, ListenerId, ViewEvent, ZoneEvent, ZoneEventKind, ZoneFilter};
pub use layout::{HIDDEN_CLASS, Layout, ZONE_ATTRIBUTE, ZoneId, ZoneRef};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, event_with_fields, json_kv,
};
pub use metrics::{LayoutMetrics, MetricSnapshot, SharedMetrics};
pub use view::{View, ViewConfig};
