//! Transition counters for a layout.

use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::logging::{LogEvent, LogFields, LogLevel};

/// Shared metrics handle a layout records into.
pub type SharedMetrics = Arc<Mutex<LayoutMetrics>>;

/// Saturating counters over zone transitions and event emission.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    attaches: u64,
    detaches: u64,
    auto_detaches: u64,
    hides: u64,
    shows: u64,
    events_emitted: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh counters behind a [`SharedMetrics`] handle.
    pub fn shared() -> SharedMetrics {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn record_attach(&mut self) {
        self.attaches = self.attaches.saturating_add(1);
    }

    pub fn record_detach(&mut self, auto: bool) {
        self.detaches = self.detaches.saturating_add(1);
        if auto {
            self.auto_detaches = self.auto_detaches.saturating_add(1);
        }
    }

    pub fn record_hide(&mut self) {
        self.hides = self.hides.saturating_add(1);
    }

    pub fn record_show(&mut self) {
        self.shows = self.shows.saturating_add(1);
    }

    pub fn record_event_emitted(&mut self) {
        self.events_emitted = self.events_emitted.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            attaches: self.attaches,
            detaches: self.detaches,
            auto_detaches: self.auto_detaches,
            hides: self.hides,
            shows: self.shows,
            events_emitted: self.events_emitted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub attaches: u64,
    pub detaches: u64,
    pub auto_detaches: u64,
    pub hides: u64,
    pub shows: u64,
    pub events_emitted: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("attaches".to_string(), json!(self.attaches));
        map.insert("detaches".to_string(), json!(self.detaches));
        map.insert("auto_detaches".to_string(), json!(self.auto_detaches));
        map.insert("hides".to_string(), json!(self.hides));
        map.insert("shows".to_string(), json!(self.shows));
        map.insert("events_emitted".to_string(), json!(self.events_emitted));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }
}
