use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct ElementInner {
    tag: String,
    attributes: HashMap<String, String>,
    classes: Vec<String>,
    children: Vec<Element>,
    text: String,
}

/// Handle to a retained element node.
///
/// Clones share the underlying node; equality is node identity. All
/// mutation happens through `&self`, so handles can be stored freely by
/// registries and event payloads. Single-threaded by construction.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementInner>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementInner {
                tag: tag.into(),
                ..ElementInner::default()
            })),
        }
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .borrow_mut()
            .attributes
            .insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.inner.borrow().attributes.get(key).cloned()
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, key: &str) -> Option<String> {
        self.inner.borrow_mut().attributes.remove(key)
    }

    /// Add a class. Re-adding an existing class keeps a single entry.
    pub fn add_class(&self, class: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.classes.iter().any(|c| c == class) {
            inner.classes.push(class.to_string());
        }
    }

    /// Remove a class, reporting whether it was present.
    pub fn remove_class(&self, class: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.classes.len();
        inner.classes.retain(|c| c != class);
        inner.classes.len() != before
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.borrow().classes.clone()
    }

    /// Append `child` as the last child. A child already present is moved
    /// to the end rather than duplicated.
    pub fn append_child(&self, child: &Element) {
        let mut inner = self.inner.borrow_mut();
        inner.children.retain(|c| !c.same_node(child));
        inner.children.push(child.clone());
    }

    /// Remove `child` from the child list, reporting whether it was
    /// present.
    pub fn remove_child(&self, child: &Element) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.children.len();
        inner.children.retain(|c| !c.same_node(child));
        inner.children.len() != before
    }

    pub fn contains(&self, child: &Element) -> bool {
        self.inner
            .borrow()
            .children
            .iter()
            .any(|c| c.same_node(child))
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Drop every child. Template re-renders go through here, which is
    /// precisely why the layout never exposes its render path.
    pub fn clear_children(&self) {
        self.inner.borrow_mut().children.clear();
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.borrow_mut().text = text.into();
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// Node identity comparison.
    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &inner.tag)
            .field("attributes", &inner.attributes)
            .field("classes", &inner.classes)
            .field("children", &inner.children.len())
            .finish()
    }
}
