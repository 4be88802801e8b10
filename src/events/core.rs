use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::layout::{Layout, ZoneId};
use crate::view::View;

/// Discriminant for zone transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneEventKind {
    Attach,
    Detach,
    Hide,
    Show,
}

impl ZoneEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneEventKind::Attach => "attach",
            ZoneEventKind::Detach => "detach",
            ZoneEventKind::Hide => "hide",
            ZoneEventKind::Show => "show",
        }
    }
}

/// Lifecycle notification emitted by a [`View`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// The view is being torn down.
    Destroy,
}

/// A zone transition, carrying the affected view and the layout that
/// announced it.
#[derive(Clone)]
pub struct ZoneEvent {
    pub kind: ZoneEventKind,
    pub zone: ZoneId,
    pub view: View,
    pub layout: Layout,
}

impl fmt::Debug for ZoneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneEvent")
            .field("kind", &self.kind)
            .field("zone", &self.zone)
            .finish()
    }
}

/// Listener predicate over zone events. Unset fields match everything, so
/// "all attaches", "everything for one zone", and "every event" are all
/// expressible.
#[derive(Debug, Clone, Default)]
pub struct ZoneFilter {
    kind: Option<ZoneEventKind>,
    zone: Option<ZoneId>,
}

impl ZoneFilter {
    /// Match every zone event.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match events of one kind across all zones.
    pub fn kind(kind: ZoneEventKind) -> Self {
        Self {
            kind: Some(kind),
            zone: None,
        }
    }

    /// Match every kind of event for one zone.
    pub fn zone(zone: impl Into<ZoneId>) -> Self {
        Self {
            kind: None,
            zone: Some(zone.into()),
        }
    }

    pub fn with_kind(mut self, kind: ZoneEventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_zone(mut self, zone: impl Into<ZoneId>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn matches(&self, event: &ZoneEvent) -> bool {
        self.kind.is_none_or(|kind| kind == event.kind)
            && self.zone.as_deref().is_none_or(|zone| zone == event.zone)
    }
}

/// Identifier handed back by [`Emitter::on`], used to unsubscribe.
pub type ListenerId = u64;

struct Listener<E> {
    id: ListenerId,
    filter: Box<dyn Fn(&E) -> bool>,
    handler: Rc<RefCell<dyn FnMut(&E)>>,
}

struct EmitterInner<E> {
    listeners: Vec<Listener<E>>,
    next_id: ListenerId,
}

/// Synchronous event dispatcher.
///
/// Handles are cheap clones sharing one listener table. Dispatch runs
/// handlers in subscription order on the emitting call stack.
pub struct Emitter<E> {
    inner: Rc<RefCell<EmitterInner<E>>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EmitterInner {
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Install a handler for events accepted by `filter`.
    pub fn on<F, H>(&self, filter: F, handler: H) -> ListenerId
    where
        F: Fn(&E) -> bool + 'static,
        H: FnMut(&E) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(Listener {
            id,
            filter: Box::new(filter),
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }

    /// Remove a listener, reporting whether it was still installed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|listener| listener.id != id);
        inner.listeners.len() != before
    }

    /// Dispatch `event` to every listener whose filter accepts it.
    ///
    /// The matching handlers are snapshotted before the first one runs, so
    /// a handler may subscribe or unsubscribe listeners (itself included)
    /// without disturbing the dispatch in flight.
    pub fn emit(&self, event: &E) {
        let matched: Vec<Rc<RefCell<dyn FnMut(&E)>>> = {
            let inner = self.inner.borrow();
            inner
                .listeners
                .iter()
                .filter(|listener| (listener.filter)(event))
                .map(|listener| Rc::clone(&listener.handler))
                .collect()
        };
        for handler in matched {
            (&mut *handler.borrow_mut())(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
