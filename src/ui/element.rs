//! Declarative element trees.
//!
//! The recorder page is an in-memory tree of elements that controllers write
//! into and the terminal renderer reads from. Elements are built from
//! [`Descriptor`]s: a kind (tag), a set of attributes and an ordered list of
//! child descriptors.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a live element in the page tree.
pub type ElementRef = Rc<RefCell<Element>>;

/// Value of a single element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// A node in the page tree.
#[derive(Debug, Default)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, AttrValue>,
    children: Vec<ElementRef>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Wraps the element into a shared handle.
    pub fn into_ref(self) -> ElementRef {
        Rc::new(RefCell::new(self))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Returns a text attribute, `None` for flags or missing attributes.
    pub fn text_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_text)
    }

    /// Sets an attribute.
    ///
    /// `class` and `className` replace the class list; anything else is
    /// stored as given, whether or not the renderer knows about it.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        if name == "class" || name == "className" {
            self.classes = value
                .to_string()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            return;
        }
        self.attrs.insert(name.to_string(), value);
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Removes `old` and adds `new` to the class list.
    pub fn swap_class(&mut self, old: &str, new: &str) {
        self.remove_class(old);
        self.add_class(new);
    }

    pub fn children(&self) -> &[ElementRef] {
        &self.children
    }

    pub fn first_child(&self) -> Option<ElementRef> {
        self.children.first().cloned()
    }

    pub fn append(&mut self, child: ElementRef) {
        self.children.push(child);
    }

    /// Detaches `child` if it is a direct child of this element.
    pub fn remove_child(&mut self, child: &ElementRef) -> bool {
        let before = self.children.len();
        self.children.retain(|c| !Rc::ptr_eq(c, child));
        before != self.children.len()
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }
}

/// Blueprint for an element and its subtree.
#[derive(Debug, Clone)]
pub struct Descriptor {
    kind: String,
    attrs: Vec<(String, AttrValue)>,
    children: Vec<Descriptor>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            kind: "div".to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Starts a descriptor for an element of the given kind.
pub fn el(kind: &str) -> Descriptor {
    Descriptor {
        kind: kind.to_string(),
        ..Default::default()
    }
}

impl Descriptor {
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.attr("textContent", AttrValue::Text(text.into()))
    }

    pub fn child(mut self, child: Descriptor) -> Self {
        self.children.push(child);
        self
    }

    /// Builds the element and, recursively, its children in order.
    pub fn build(&self) -> ElementRef {
        let mut element = Element::new(self.kind.as_str());
        for (name, value) in &self.attrs {
            element.set_attr(name, value.clone());
        }
        for child in &self.children {
            element.append(child.build());
        }
        element.into_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kind_is_div() {
        let node = Descriptor::default().build();
        assert_eq!(node.borrow().tag(), "div");
    }

    #[test]
    fn test_build_nested_children_in_order() {
        let node = el("div")
            .class("audio_item")
            .child(el("audio").attr("src", "a.wav"))
            .child(el("button").class("btn").child(el("img").attr("src", "img/play.png")))
            .child(el("p").text("label"))
            .build();

        let node = node.borrow();
        assert!(node.has_class("audio_item"));
        let tags: Vec<String> = node
            .children()
            .iter()
            .map(|c| c.borrow().tag().to_string())
            .collect();
        assert_eq!(tags, vec!["audio", "button", "p"]);

        let button = node.children()[1].borrow();
        let img = button.first_child().unwrap();
        assert_eq!(img.borrow().text_attr("src"), Some("img/play.png"));
    }

    #[test]
    fn test_unknown_attributes_pass_through() {
        let node = el("audio")
            .attr("controls", true)
            .attr("data-whatever", "x")
            .build();
        let node = node.borrow();
        assert_eq!(node.attr("controls"), Some(&AttrValue::Flag(true)));
        assert_eq!(node.text_attr("data-whatever"), Some("x"));
    }

    #[test]
    fn test_class_name_alias_and_swap() {
        let node = el("div").attr("className", "box hide").build();
        let mut node = node.borrow_mut();
        assert!(node.has_class("hide"));
        node.swap_class("hide", "show");
        assert!(node.has_class("show"));
        assert!(!node.has_class("hide"));
        assert_eq!(node.classes(), ["box", "show"]);
    }

    #[test]
    fn test_remove_child_by_identity() {
        let parent = el("div").build();
        let a = el("p").build();
        let b = el("p").build();
        parent.borrow_mut().append(a.clone());
        parent.borrow_mut().append(b.clone());

        assert!(parent.borrow_mut().remove_child(&a));
        assert!(!parent.borrow_mut().remove_child(&a));
        assert_eq!(parent.borrow().children().len(), 1);
        assert!(Rc::ptr_eq(&parent.borrow().children()[0], &b));
    }
}
