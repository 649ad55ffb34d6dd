//! Tree model for HTML fragments.
//!
//! A fragment is a tree of [`Node`]s: elements carry a lowercase tag name,
//! an attribute map and an ordered child list; text nodes carry a string.
//! Trees are plain values. Equality is structural and ignores attribute
//! order.

mod object_hash;

pub use object_hash::{canonical_form, DefaultObjectHash, DigestObjectHash, ObjectHash};

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute map of an element. Insertion order is kept for printing.
pub type Attributes = IndexMap<String, String>;

/// A node in a parsed HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// An element with a tag name, attributes and children.
    Element(Element),
    /// A run of text.
    Text(String),
}

impl Node {
    /// Creates an element node with no attributes or children.
    pub fn element(tag_name: impl AsRef<str>) -> Self {
        Node::Element(Element::new(tag_name))
    }

    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Returns true if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Returns the text, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => {
                for child in &e.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        match self {
            Node::Text(_) => 1,
            Node::Element(e) => 1 + e.children.iter().map(Node::subtree_size).sum::<usize>(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Lowercase tag name, never empty.
    pub tag_name: String,
    /// Attributes (name to value). Order is irrelevant to equality.
    #[serde(default)]
    pub attributes: Attributes,
    /// Child nodes in document order.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element, lowercasing the tag name.
    pub fn new(tag_name: impl AsRef<str>) -> Self {
        Element {
            tag_name: tag_name.as_ref().to_ascii_lowercase(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute and returns the element.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Appends a child and returns the element.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends several children and returns the element.
    pub fn with_children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Returns the value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The first tag name in this subtree that is empty or not lowercase.
    pub fn find_invalid_tag_name(&self) -> Option<&str> {
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            if !is_valid_tag_name(&element.tag_name) {
                return Some(&element.tag_name);
            }
            stack.extend(element.children.iter().filter_map(Node::as_element));
        }
        None
    }
}

/// Returns true if `name` can be an element's tag name: non-empty and
/// without ASCII uppercase letters.
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty() && !name.bytes().any(|b| b.is_ascii_uppercase())
}

/// A value carried by a change descriptor.
///
/// Tag names, attribute values and text nodes are strings; array items may
/// also be whole elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An element subtree.
    Element(Element),
    /// A tag name, attribute value or text node.
    String(String),
}

impl Value {
    /// Returns the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Element(_) => None,
        }
    }

    /// Converts the value into a tree node. Strings become text nodes.
    pub fn into_node(self) -> Node {
        match self {
            Value::Element(e) => Node::Element(e),
            Value::String(s) => Node::Text(s),
        }
    }

    /// Converts the value into a string, if it is one.
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::String(s) => Some(s),
            Value::Element(_) => None,
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Element(e) => Value::Element(e),
            Node::Text(t) => Value::String(t),
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        Value::from(node.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::html::print_element(self))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::html::print_to_string(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_is_lowercased() {
        let e = Element::new("DiV");
        assert_eq!(e.tag_name, "div");
    }

    #[test]
    fn test_equality_ignores_attribute_order() {
        let a = Element::new("div")
            .with_attribute("id", "x")
            .with_attribute("class", "y");
        let b = Element::new("div")
            .with_attribute("class", "y")
            .with_attribute("id", "x");
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_respects_child_order() {
        let a = Element::new("ul").with_children(["a", "b"]);
        let b = Element::new("ul").with_children(["b", "a"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Node::from(Element::new("div").with_child(Element::new("span").with_child("x")));
        let mut copy = original.clone();
        if let Some(e) = copy.as_element_mut() {
            e.children.clear();
        }
        assert_eq!(original.subtree_size(), 3);
        assert_eq!(copy.subtree_size(), 1);
    }

    #[test]
    fn test_text_content() {
        let node = Node::from(
            Element::new("p")
                .with_child("Hello ")
                .with_child(Element::new("b").with_child("World")),
        );
        assert_eq!(node.text_content(), "Hello World");
    }

    #[test]
    fn test_serde_shape() {
        let node = Node::from(
            Element::new("div")
                .with_attribute("class", "a")
                .with_child("hi"),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tagName": "div",
                "attributes": { "class": "a" },
                "children": ["hi"]
            })
        );
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_invalid_tag_names_are_found() {
        assert!(is_valid_tag_name("div"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("DIV"));

        let good = Element::new("ul").with_child(Element::new("li").with_child("x"));
        assert_eq!(good.find_invalid_tag_name(), None);

        let mut bad = good.clone();
        bad.children.push(Node::Element(Element {
            tag_name: "Li".to_string(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }));
        assert_eq!(bad.find_invalid_tag_name(), Some("Li"));
    }

    #[test]
    fn test_text_accessors() {
        let text = Node::text("hi");
        assert!(text.is_text());
        assert_eq!(text.as_text(), Some("hi"));

        let element = Node::element("p");
        assert!(!element.is_text());
        assert_eq!(element.as_text(), None);
    }

    #[test]
    fn test_value_conversions() {
        let v = Value::from(Node::text("abc"));
        assert_eq!(v.as_str(), Some("abc"));
        assert_eq!(v.into_node(), Node::text("abc"));

        let e = Element::new("br");
        let v = Value::from(Node::from(e.clone()));
        assert_eq!(v, Value::Element(e));
    }
}
