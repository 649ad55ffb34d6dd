//! Object hashes used to recognise the same logical item across two child
//! lists.
//!
//! An object hash deliberately ignores an element's descendants: two
//! elements with equal tag and attributes hash identically even when their
//! children differ, so the differ treats them as one item that may have
//! moved and changed internally.

use md5::{Digest, Md5};

use super::Node;

/// Maps a child-list item to a short string identifying it.
///
/// `index` is the item's position in its child list. Closures with the
/// matching signature implement this trait.
pub trait ObjectHash: Send + Sync {
    /// Returns the identity string of `node`.
    fn hash(&self, node: &Node, index: usize) -> String;
}

impl<F> ObjectHash for F
where
    F: Fn(&Node, usize) -> String + Send + Sync,
{
    fn hash(&self, node: &Node, index: usize) -> String {
        self(node, index)
    }
}

/// Hashes text nodes to their text and elements to their canonical opening
/// tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectHash;

impl ObjectHash for DefaultObjectHash {
    fn hash(&self, node: &Node, _index: usize) -> String {
        canonical_form(node)
    }
}

/// Like [`DefaultObjectHash`] but reduces the canonical form to a fixed
/// 32-character MD5 hex digest. Useful when text nodes are long.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestObjectHash;

impl ObjectHash for DigestObjectHash {
    fn hash(&self, node: &Node, _index: usize) -> String {
        let mut hasher = Md5::new();
        match node {
            // Keep text and element digests apart.
            Node::Text(t) => {
                hasher.update(b"t");
                hasher.update(t.as_bytes());
            }
            Node::Element(_) => {
                hasher.update(b"e");
                hasher.update(canonical_form(node).as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Canonical identity string of a node.
///
/// Text yields the text itself. An element yields its opening tag with
/// attributes sorted by name, e.g. `<a href="/x" id="y">`.
pub fn canonical_form(node: &Node) -> String {
    match node {
        Node::Text(t) => t.clone(),
        Node::Element(e) => {
            let mut names: Vec<&String> = e.attributes.keys().collect();
            names.sort();

            let mut out = String::with_capacity(2 + e.tag_name.len());
            out.push('<');
            out.push_str(&e.tag_name);
            for name in names {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&e.attributes[name]);
                out.push('"');
            }
            out.push('>');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    #[test]
    fn test_text_hash_is_text() {
        assert_eq!(DefaultObjectHash.hash(&Node::text("Hello"), 0), "Hello");
    }

    #[test]
    fn test_element_hash_sorts_attributes() {
        let a = Node::from(
            Element::new("a")
                .with_attribute("id", "y")
                .with_attribute("href", "/x"),
        );
        assert_eq!(DefaultObjectHash.hash(&a, 0), r#"<a href="/x" id="y">"#);
    }

    #[test]
    fn test_element_hash_ignores_children() {
        let a = Node::from(Element::new("li").with_child("one"));
        let b = Node::from(Element::new("li").with_child("two"));
        assert_eq!(DefaultObjectHash.hash(&a, 0), DefaultObjectHash.hash(&b, 3));
    }

    #[test]
    fn test_digest_hash() {
        let h = DigestObjectHash.hash(&Node::text("Hello"), 0);
        assert_eq!(h.len(), 32);
        assert_ne!(h, DigestObjectHash.hash(&Node::text("Hello!"), 0));
        // "<br>" as text must not collide with an empty <br> element.
        assert_ne!(
            DigestObjectHash.hash(&Node::text("<br>"), 0),
            DigestObjectHash.hash(&Node::element("br"), 0)
        );
    }

    #[test]
    fn test_closure_hash() {
        let by_index = |_: &Node, index: usize| index.to_string();
        assert_eq!(by_index.hash(&Node::text("x"), 7), "7");
    }
}
