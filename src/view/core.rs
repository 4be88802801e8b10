use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::Element;
use crate::error::{LayoutError, Result};
use crate::events::{Emitter, ViewEvent};

/// Options accepted by [`View::new`].
#[derive(Debug, Clone, Default)]
pub struct ViewConfig {
    name: Option<String>,
    element: Option<Element>,
    tag: Option<String>,
    template: Option<String>,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zone name the view registers under when attached to a layout.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mount an existing element instead of creating one.
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Create a fresh element of `tag`. Ignored when an element is given.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

struct ViewInner {
    name: Option<String>,
    element: Element,
    template: Option<String>,
    destroyed: bool,
}

/// Clonable handle to a view. Clones share state; equality is handle
/// identity.
#[derive(Clone)]
pub struct View {
    inner: Rc<RefCell<ViewInner>>,
    events: Emitter<ViewEvent>,
}

impl View {
    /// Build a view from `config`.
    ///
    /// The element is taken from the config directly or created from the
    /// configured tag; a config carrying neither fails with
    /// [`LayoutError::MissingElement`] so every later operation on the
    /// handle is infallible.
    pub fn new(config: ViewConfig) -> Result<Self> {
        let element = match (config.element, config.tag) {
            (Some(element), _) => element,
            (None, Some(tag)) => Element::new(tag),
            (None, None) => return Err(LayoutError::MissingElement),
        };

        Ok(Self {
            inner: Rc::new(RefCell::new(ViewInner {
                name: config.name,
                element,
                template: config.template,
                destroyed: false,
            })),
            events: Emitter::new(),
        })
    }

    pub fn name(&self) -> Option<String> {
        self.inner.borrow().name.clone()
    }

    pub fn element(&self) -> Element {
        self.inner.borrow().element.clone()
    }

    /// Lifecycle event stream. The layout listens here for
    /// [`ViewEvent::Destroy`].
    pub fn events(&self) -> Emitter<ViewEvent> {
        self.events.clone()
    }

    /// Re-apply the configured template into the element.
    pub fn render(&self) -> &Self {
        self.render_template()
    }

    /// Replace the element's children and text with the template output.
    ///
    /// This is the capability a layout must never reach: a template pass
    /// over a container would drop its mounted children wholesale.
    pub fn render_template(&self) -> &Self {
        let (element, template) = {
            let inner = self.inner.borrow();
            (inner.element.clone(), inner.template.clone())
        };
        if let Some(template) = template {
            element.clear_children();
            element.set_text(template);
        }
        self
    }

    /// Tear the view down. The first call emits [`ViewEvent::Destroy`];
    /// later calls are no-ops.
    pub fn destroy(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return;
            }
            inner.destroyed = true;
        }
        self.events.emit(&ViewEvent::Destroy);
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    /// Handle identity comparison.
    pub fn same_view(&self, other: &View) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.same_view(other)
    }
}

impl Eq for View {}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("View")
            .field("name", &inner.name)
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}
