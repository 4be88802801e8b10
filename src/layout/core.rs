use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::json;

use crate::dom::Element;
use crate::error::{LayoutError, Result};
use crate::events::{Emitter, ListenerId, ViewEvent, ZoneEvent, ZoneEventKind, ZoneFilter};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{LayoutMetrics, SharedMetrics};
use crate::view::{View, ViewConfig};

/// Zone lookup key.
pub type ZoneId = String;

/// Attribute stamped on an attached zone's element, recording its name.
pub const ZONE_ATTRIBUTE: &str = "x-ak-layout-zone";

/// Class marking a hidden zone's element.
pub const HIDDEN_CLASS: &str = "ak-layout-zone-hidden";

const LOG_TARGET: &str = "atrium::layout";

/// Argument position for operations addressing a zone by name or by view.
///
/// A nameless view resolves to no key, so operations handed one return
/// without touching anything.
pub trait ZoneRef {
    fn zone_name(&self) -> Option<ZoneId>;
}

impl ZoneRef for &str {
    fn zone_name(&self) -> Option<ZoneId> {
        Some((*self).to_string())
    }
}

impl ZoneRef for String {
    fn zone_name(&self) -> Option<ZoneId> {
        Some(self.clone())
    }
}

impl ZoneRef for &String {
    fn zone_name(&self) -> Option<ZoneId> {
        Some((*self).clone())
    }
}

impl ZoneRef for &View {
    fn zone_name(&self) -> Option<ZoneId> {
        self.name()
    }
}

impl ZoneRef for View {
    fn zone_name(&self) -> Option<ZoneId> {
        self.name()
    }
}

struct LayoutInner {
    root: View,
    zones: HashMap<ZoneId, View>,
    destroy_listeners: HashMap<ZoneId, ListenerId>,
    logger: Option<Logger>,
    metrics: Option<SharedMetrics>,
}

/// Container that arranges named zones inside a single root element.
///
/// Every registered view's element is a direct child of the root element,
/// stamped with [`ZONE_ATTRIBUTE`]; child order is attach order. Registry
/// and tree mutation always complete before the transition event fires.
///
/// The layout wraps its root view privately and never exposes `render` /
/// `render_template`. A template pass over the root would silently drop
/// every mounted zone, so the capability is unreachable rather than
/// overridden.
///
/// Handles are cheap clones sharing one container; equality is handle
/// identity.
#[derive(Clone)]
pub struct Layout {
    inner: Rc<RefCell<LayoutInner>>,
    events: Emitter<ZoneEvent>,
}

impl Layout {
    /// Build a layout over the root view described by `config`.
    ///
    /// The config is required and must yield a root element (see
    /// [`ViewConfig::with_element`] / [`ViewConfig::with_tag`]).
    pub fn new(config: ViewConfig) -> Result<Self> {
        let root = View::new(config)?;
        Ok(Self {
            inner: Rc::new(RefCell::new(LayoutInner {
                root,
                zones: HashMap::new(),
                destroy_listeners: HashMap::new(),
                logger: None,
                metrics: None,
            })),
            events: Emitter::new(),
        })
    }

    /// Record every transition on `logger` at debug level.
    pub fn with_logger(self, logger: Logger) -> Self {
        self.inner.borrow_mut().logger = Some(logger);
        self
    }

    /// Count transitions into `metrics`.
    pub fn with_metrics(self, metrics: SharedMetrics) -> Self {
        self.inner.borrow_mut().metrics = Some(metrics);
        self
    }

    pub fn metrics_handle(&self) -> Option<SharedMetrics> {
        self.inner.borrow().metrics.clone()
    }

    /// Root element the zones are mounted under.
    pub fn element(&self) -> Element {
        self.inner.borrow().root.element()
    }

    /// Subscribe to zone transitions matching `filter`.
    pub fn on<H>(&self, filter: ZoneFilter, handler: H) -> ListenerId
    where
        H: FnMut(&ZoneEvent) + 'static,
    {
        self.events.on(move |event| filter.matches(event), handler)
    }

    /// Remove a listener installed with [`Layout::on`].
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Look up the view registered under `name`. Pure; no side effects.
    pub fn zone(&self, name: &str) -> Option<View> {
        self.inner.borrow().zones.get(name).cloned()
    }

    pub fn zone_count(&self) -> usize {
        self.inner.borrow().zones.len()
    }

    /// Zone names in mount order (the root element's child order).
    pub fn zone_names(&self) -> Vec<ZoneId> {
        self.element()
            .children()
            .iter()
            .filter_map(|child| child.attribute(ZONE_ATTRIBUTE))
            .collect()
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.zone(name)
            .map(|view| view.element().has_class(HIDDEN_CLASS))
            .unwrap_or(false)
    }

    /// Register `view` under its own name and mount its element as the
    /// last child of the root.
    ///
    /// Re-attaching a name already registered is a no-op. A view without
    /// a non-empty name fails with [`LayoutError::ZoneNameRequired`]
    /// before any state is touched. The layout subscribes to the view's
    /// destroy event and detaches the zone automatically when it fires.
    pub fn attach(&self, view: &View) -> Result<&Self> {
        self.attach_inner(view, false)
    }

    /// [`Layout::attach`] without the transition event.
    pub fn attach_silent(&self, view: &View) -> Result<&Self> {
        self.attach_inner(view, true)
    }

    fn attach_inner(&self, view: &View, silent: bool) -> Result<&Self> {
        let name = view
            .name()
            .filter(|name| !name.is_empty())
            .ok_or(LayoutError::ZoneNameRequired)?;

        if self.inner.borrow().zones.contains_key(&name) {
            return Ok(self);
        }

        let element = view.element();
        element.set_attribute(ZONE_ATTRIBUTE, name.clone());

        let listener = {
            let weak = Rc::downgrade(&self.inner);
            let events = self.events.clone();
            let zone = view.clone();
            view.events().on(
                |event| matches!(event, ViewEvent::Destroy),
                move |_| {
                    if let Some(inner) = weak.upgrade() {
                        let layout = Layout {
                            inner,
                            events: events.clone(),
                        };
                        layout.detach_inner(&zone, false, true);
                    }
                },
            )
        };

        {
            let mut inner = self.inner.borrow_mut();
            inner.zones.insert(name.clone(), view.clone());
            inner.destroy_listeners.insert(name.clone(), listener);
            inner.root.element().append_child(&element);
        }

        self.record(|metrics| metrics.record_attach());
        self.log_transition("zone_attached", &name, silent);
        if !silent {
            self.emit(ZoneEventKind::Attach, name, view.clone());
        }
        Ok(self)
    }

    /// Unregister the zone addressed by `zone` and unmount its element.
    ///
    /// Unknown names and nameless views are no-ops; detach is always safe
    /// to call redundantly.
    pub fn detach<Z: ZoneRef>(&self, zone: Z) -> &Self {
        self.detach_inner(zone, false, false)
    }

    /// [`Layout::detach`] without the transition event.
    pub fn detach_silent<Z: ZoneRef>(&self, zone: Z) -> &Self {
        self.detach_inner(zone, true, false)
    }

    fn detach_inner<Z: ZoneRef>(&self, zone: Z, silent: bool, auto: bool) -> &Self {
        let Some(name) = zone.zone_name() else {
            return self;
        };

        let (view, listener) = {
            let mut inner = self.inner.borrow_mut();
            let Some(view) = inner.zones.remove(&name) else {
                return self;
            };
            let listener = inner.destroy_listeners.remove(&name);
            inner.root.element().remove_child(&view.element());
            (view, listener)
        };

        if let Some(listener) = listener {
            view.events().off(listener);
        }

        self.record(|metrics| metrics.record_detach(auto));
        self.log_transition("zone_detached", &name, silent);
        if !silent {
            self.emit(ZoneEventKind::Detach, name, view);
        }
        self
    }

    /// Mark the zone's element hidden. Idempotent: the marker class is
    /// stored once however often this is called, and the event still
    /// fires unless silenced.
    pub fn hide<Z: ZoneRef>(&self, zone: Z) -> &Self {
        self.set_hidden(zone, true, false)
    }

    /// [`Layout::hide`] without the transition event.
    pub fn hide_silent<Z: ZoneRef>(&self, zone: Z) -> &Self {
        self.set_hidden(zone, true, true)
    }

    /// Remove the hidden marker from the zone's element. Idempotent.
    pub fn show<Z: ZoneRef>(&self, zone: Z) -> &Self {
        self.set_hidden(zone, false, false)
    }

    /// [`Layout::show`] without the transition event.
    pub fn show_silent<Z: ZoneRef>(&self, zone: Z) -> &Self {
        self.set_hidden(zone, false, true)
    }

    fn set_hidden<Z: ZoneRef>(&self, zone: Z, hidden: bool, silent: bool) -> &Self {
        let Some(name) = zone.zone_name() else {
            return self;
        };
        let Some(view) = self.zone(&name) else {
            return self;
        };

        if hidden {
            view.element().add_class(HIDDEN_CLASS);
        } else {
            view.element().remove_class(HIDDEN_CLASS);
        }

        let (kind, message) = if hidden {
            (ZoneEventKind::Hide, "zone_hidden")
        } else {
            (ZoneEventKind::Show, "zone_shown")
        };
        self.record(|metrics| {
            if hidden {
                metrics.record_hide()
            } else {
                metrics.record_show()
            }
        });
        self.log_transition(message, &name, silent);
        if !silent {
            self.emit(kind, name, view);
        }
        self
    }

    fn emit(&self, kind: ZoneEventKind, zone: ZoneId, view: View) {
        self.record(|metrics| metrics.record_event_emitted());
        let event = ZoneEvent {
            kind,
            zone,
            view,
            layout: self.clone(),
        };
        self.events.emit(&event);
    }

    fn log_transition(&self, message: &str, zone: &str, silent: bool) {
        let logger = self.inner.borrow().logger.clone();
        if let Some(logger) = logger {
            let event = event_with_fields(
                LogLevel::Debug,
                LOG_TARGET,
                message,
                [json_kv("zone", json!(zone)), json_kv("silent", json!(silent))],
            );
            let _ = logger.log_event(event);
        }
    }

    fn record(&self, apply: impl FnOnce(&mut LayoutMetrics)) {
        let metrics = self.inner.borrow().metrics.clone();
        if let Some(metrics) = metrics {
            if let Ok(mut guard) = metrics.lock() {
                apply(&mut guard);
            }
        }
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Layout {}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Layout")
            .field("zones", &inner.zones.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use std::cell::Cell;
    use std::sync::Arc;

    fn layout() -> Layout {
        Layout::new(ViewConfig::new().with_tag("div")).expect("layout")
    }

    fn zone_view(name: &str) -> View {
        View::new(ViewConfig::new().with_tag("div").with_name(name)).expect("view")
    }

    fn unnamed_view() -> View {
        View::new(ViewConfig::new().with_tag("div")).expect("view")
    }

    fn count_events(layout: &Layout, filter: ZoneFilter) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        layout.on(filter, move |_| counter.set(counter.get() + 1));
        count
    }

    #[test]
    fn new_requires_an_element_source() {
        let err = Layout::new(ViewConfig::new()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingElement));
    }

    #[test]
    fn attach_registers_zone_and_mounts_element() {
        let layout = layout();
        let view = zone_view("zone-1");

        layout.attach(&view).expect("attach");

        assert_eq!(layout.zone("zone-1"), Some(view.clone()));
        assert_eq!(layout.element().child_count(), 1);
        assert!(layout.element().children()[0].same_node(&view.element()));
        assert_eq!(
            view.element().attribute(ZONE_ATTRIBUTE).as_deref(),
            Some("zone-1")
        );
    }

    #[test]
    fn attach_same_name_is_idempotent() {
        let layout = layout();
        let view = zone_view("zone-1");
        let other = zone_view("zone-2");

        layout.attach(&view).expect("attach");
        layout.attach(&other).expect("attach");
        layout.attach(&view).expect("reattach");

        assert_eq!(layout.zone_count(), 2);
        assert_eq!(layout.element().child_count(), 2);
        assert_eq!(layout.zone_names(), vec!["zone-1", "zone-2"]);
    }

    #[test]
    fn attach_without_name_fails_without_mutation() {
        let layout = layout();
        let view = unnamed_view();

        let err = layout.attach(&view).unwrap_err();

        assert!(matches!(err, LayoutError::ZoneNameRequired));
        assert_eq!(layout.zone_count(), 0);
        assert_eq!(layout.element().child_count(), 0);
        assert!(view.element().attribute(ZONE_ATTRIBUTE).is_none());
        assert_eq!(view.events().listener_count(), 0);
    }

    #[test]
    fn attach_rejects_empty_name() {
        let layout = layout();
        let view = zone_view("");

        let err = layout.attach(&view).unwrap_err();

        assert!(matches!(err, LayoutError::ZoneNameRequired));
        assert_eq!(layout.zone_count(), 0);
    }

    #[test]
    fn detach_by_name_then_by_view() {
        let layout = layout();
        let first = zone_view("zone-1");
        let second = zone_view("zone-2");
        layout.attach(&first).expect("attach");
        layout.attach(&second).expect("attach");

        layout.detach("zone-1");

        assert_eq!(layout.zone("zone-1"), None);
        assert_eq!(layout.element().child_count(), 1);
        assert!(layout.element().children()[0].same_node(&second.element()));

        layout.detach(&second);

        assert_eq!(layout.zone_count(), 0);
        assert_eq!(layout.element().child_count(), 0);
    }

    #[test]
    fn detach_unknown_zone_is_a_noop() {
        let layout = layout();
        let view = zone_view("zone-1");
        layout.attach(&view).expect("attach");

        layout.detach("zone-9").detach("zone-9");

        assert_eq!(layout.zone_count(), 1);
        assert_eq!(layout.element().child_count(), 1);
    }

    #[test]
    fn nameless_view_arguments_are_noops() {
        let layout = layout();
        let view = zone_view("zone-1");
        let events = count_events(&layout, ZoneFilter::any());
        layout.attach(&view).expect("attach");

        let stray = unnamed_view();
        layout.detach(&stray).hide(&stray).show(&stray);

        assert_eq!(layout.zone_count(), 1);
        assert_eq!(events.get(), 1); // the attach only
    }

    #[test]
    fn hide_and_show_toggle_the_marker() {
        let layout = layout();
        let first = zone_view("zone-1");
        let second = zone_view("zone-2");
        layout.attach(&first).expect("attach");
        layout.attach(&second).expect("attach");

        layout.hide("zone-1");
        assert!(first.element().has_class(HIDDEN_CLASS));
        assert!(!second.element().has_class(HIDDEN_CLASS));
        assert!(layout.is_hidden("zone-1"));

        layout.hide("zone-1");
        assert_eq!(
            first
                .element()
                .classes()
                .iter()
                .filter(|class| class.as_str() == HIDDEN_CLASS)
                .count(),
            1
        );

        layout.show(&first);
        assert!(!first.element().has_class(HIDDEN_CLASS));
        assert!(!layout.is_hidden("zone-1"));

        layout.show(&first); // idempotent
        assert!(!first.element().has_class(HIDDEN_CLASS));
    }

    #[test]
    fn hide_unknown_zone_is_a_noop() {
        let layout = layout();
        let events = count_events(&layout, ZoneFilter::any());

        layout.hide("ghost").show("ghost");

        assert_eq!(events.get(), 0);
    }

    #[test]
    fn destroy_auto_detaches_with_event() {
        let layout = layout();
        let view = zone_view("zone-1");
        layout.attach(&view).expect("attach");
        let detaches = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Detach));

        view.destroy();

        assert_eq!(detaches.get(), 1);
        assert_eq!(layout.zone("zone-1"), None);
        assert_eq!(layout.element().child_count(), 0);
    }

    #[test]
    fn detach_unsubscribes_the_destroy_listener() {
        let layout = layout();
        let view = zone_view("zone-1");
        layout.attach(&view).expect("attach");
        let detaches = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Detach));

        layout.detach(&view);
        assert_eq!(view.events().listener_count(), 0);

        view.destroy();

        assert_eq!(detaches.get(), 1); // the manual detach only
    }

    #[test]
    fn reattach_rearms_the_destroy_listener() {
        let layout = layout();
        let view = zone_view("zone-1");
        layout.attach(&view).expect("attach");
        layout.detach_silent(&view);
        layout.attach(&view).expect("reattach");
        let detaches = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Detach));

        view.destroy();

        assert_eq!(detaches.get(), 1);
        assert_eq!(layout.zone_count(), 0);
    }

    #[test]
    fn silent_variants_mutate_without_events() {
        let layout = layout();
        let view = zone_view("zone-1");
        let events = count_events(&layout, ZoneFilter::any());

        layout.attach_silent(&view).expect("attach");
        layout.hide_silent(&view);
        assert!(view.element().has_class(HIDDEN_CLASS));
        layout.show_silent("zone-1");
        assert!(!view.element().has_class(HIDDEN_CLASS));
        layout.detach_silent("zone-1");

        assert_eq!(events.get(), 0);
        assert_eq!(layout.zone_count(), 0);
        assert_eq!(layout.element().child_count(), 0);
    }

    #[test]
    fn events_carry_zone_view_and_layout() {
        let layout = layout();
        let view = zone_view("zone-1");
        let seen: Rc<RefCell<Vec<(ZoneEventKind, ZoneId)>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let expected_view = view.clone();
        let expected_layout = layout.clone();
        layout.on(ZoneFilter::any(), move |event| {
            assert_eq!(event.view, expected_view);
            assert_eq!(event.layout, expected_layout);
            sink.borrow_mut().push((event.kind, event.zone.clone()));
        });

        layout.attach(&view).expect("attach");
        layout.hide(&view);
        layout.show("zone-1");
        layout.detach(&view);

        assert_eq!(
            *seen.borrow(),
            vec![
                (ZoneEventKind::Attach, "zone-1".to_string()),
                (ZoneEventKind::Hide, "zone-1".to_string()),
                (ZoneEventKind::Show, "zone-1".to_string()),
                (ZoneEventKind::Detach, "zone-1".to_string()),
            ]
        );
    }

    #[test]
    fn filters_narrow_the_stream() {
        let layout = layout();
        let first = zone_view("zone-1");
        let second = zone_view("zone-2");

        let attaches = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Attach));
        let zone_two = count_events(&layout, ZoneFilter::zone("zone-2"));
        let hides_of_two = count_events(
            &layout,
            ZoneFilter::zone("zone-2").with_kind(ZoneEventKind::Hide),
        );
        let everything = count_events(&layout, ZoneFilter::any());

        layout.attach(&first).expect("attach");
        layout.attach(&second).expect("attach");
        layout.hide(&first);
        layout.hide(&second);
        layout.show(&second);

        assert_eq!(attaches.get(), 2);
        assert_eq!(zone_two.get(), 3); // attach, hide, show
        assert_eq!(hides_of_two.get(), 1);
        assert_eq!(everything.get(), 5);
    }

    #[test]
    fn off_stops_delivery() {
        let layout = layout();
        let view = zone_view("zone-1");
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let id = layout.on(ZoneFilter::any(), move |_| counter.set(counter.get() + 1));

        layout.attach(&view).expect("attach");
        assert!(layout.off(id));
        assert!(!layout.off(id));
        layout.hide(&view);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn transition_sequence_counts() {
        let layout = layout();
        let first = zone_view("zone-1");
        let second = zone_view("zone-2");
        let third = zone_view("zone-3");

        let attaches = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Attach));
        let detaches = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Detach));
        let hides = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Hide));
        let shows = count_events(&layout, ZoneFilter::kind(ZoneEventKind::Show));

        layout.attach(&first).expect("attach");
        layout.attach(&second).expect("attach");
        layout.attach(&third).expect("attach");
        layout.detach_silent(&first);
        layout.detach(&second);
        layout.attach_silent(&second).expect("attach");
        layout.attach(&first).expect("attach");
        third.destroy();
        layout.hide(&first);
        layout.hide("zone-2");
        layout.show("zone-1");
        layout.show(&second);
        layout.hide_silent("zone-1");
        assert!(first.element().has_class(HIDDEN_CLASS));
        layout.show_silent("zone-2");
        assert!(!second.element().has_class(HIDDEN_CLASS));

        assert_eq!(attaches.get(), 4);
        assert_eq!(detaches.get(), 2); // manual zone-2 + destroyed zone-3
        assert_eq!(hides.get(), 2);
        assert_eq!(shows.get(), 2);
    }

    #[test]
    fn logger_records_every_transition() {
        let sink = Arc::new(MemorySink::new());
        let layout = layout().with_logger(Logger::from_shared(sink.clone()));
        let view = zone_view("zone-1");

        layout.attach(&view).expect("attach");
        layout.hide(&view);
        layout.show_silent(&view);
        layout.detach(&view);

        let messages: Vec<String> = sink
            .events()
            .into_iter()
            .map(|event| event.message)
            .collect();
        assert_eq!(
            messages,
            vec!["zone_attached", "zone_hidden", "zone_shown", "zone_detached"]
        );
        let shown = &sink.events()[2];
        assert_eq!(shown.fields.get("silent"), Some(&json!(true)));
        assert_eq!(shown.fields.get("zone"), Some(&json!("zone-1")));
    }

    #[test]
    fn metrics_count_operations() {
        let metrics = LayoutMetrics::shared();
        let layout = layout().with_metrics(Arc::clone(&metrics));
        let first = zone_view("zone-1");
        let second = zone_view("zone-2");

        layout.attach(&first).expect("attach");
        layout.attach(&second).expect("attach");
        layout.hide(&first);
        layout.show_silent(&first);
        layout.detach(&second);
        first.destroy();

        let snapshot = metrics.lock().expect("metrics").snapshot();
        assert_eq!(snapshot.attaches, 2);
        assert_eq!(snapshot.detaches, 2);
        assert_eq!(snapshot.auto_detaches, 1);
        assert_eq!(snapshot.hides, 1);
        assert_eq!(snapshot.shows, 1);
        // show was silent, everything else emitted
        assert_eq!(snapshot.events_emitted, 5);
    }

    #[test]
    fn listener_may_reenter_the_layout() {
        let layout = layout();
        let first = zone_view("zone-1");
        let second = zone_view("zone-2");

        let handle = layout.clone();
        let next = second.clone();
        layout.on(ZoneFilter::kind(ZoneEventKind::Detach), move |event| {
            if event.zone == "zone-1" {
                handle.attach(&next).expect("attach from listener");
            }
        });

        layout.attach(&first).expect("attach");
        layout.detach(&first);

        assert_eq!(layout.zone("zone-2"), Some(second));
        assert_eq!(layout.zone_count(), 1);
    }
}
