//! The [`DiffPatch`] façade: one configured differ and patcher behind the
//! operations callers need.

use crate::delta::Delta;
use crate::diff::{reverse, DiffOptions, Differ, PatchOptions, Patcher};
use crate::error::Result;
use crate::html;
use crate::node::Node;

/// Diff, patch, unpatch and reverse with a fixed configuration.
///
/// Instances are cheap to build and hold no mutable state. Per-call options
/// build a transient differ or patcher; the instance is never changed.
#[derive(Debug, Clone, Default)]
pub struct DiffPatch {
    differ: Differ,
    patcher: Patcher,
}

impl DiffPatch {
    /// Creates an instance with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an instance with the given diff options.
    pub fn create(options: DiffOptions) -> Self {
        DiffPatch {
            differ: Differ::with_options(options),
            patcher: Patcher::new(),
        }
    }

    /// The diff options of this instance.
    pub fn options(&self) -> &DiffOptions {
        self.differ.options()
    }

    /// Computes the delta from `left` to `right`, or `None` if they are
    /// equal.
    pub fn diff(&self, left: &Node, right: &Node) -> Option<Delta> {
        self.differ.diff(left, right)
    }

    /// Like [`diff`](Self::diff), with options for this call only.
    pub fn diff_with(&self, left: &Node, right: &Node, options: &DiffOptions) -> Option<Delta> {
        Differ::with_options(options.clone()).diff(left, right)
    }

    /// Applies `delta` to `tree`.
    pub fn patch(&self, tree: &Node, delta: &Delta) -> Result<Node> {
        self.patcher.apply(tree, delta)
    }

    /// Like [`patch`](Self::patch), with options for this call only.
    pub fn patch_with(&self, tree: &Node, delta: &Delta, options: PatchOptions) -> Result<Node> {
        Patcher::with_options(options).apply(tree, delta)
    }

    /// Undoes `delta` on the tree it produced.
    pub fn unpatch(&self, tree: &Node, delta: &Delta) -> Result<Node> {
        self.patcher.unapply(tree, delta)
    }

    /// Inverts a delta.
    pub fn reverse(&self, delta: &Delta) -> Delta {
        reverse(delta)
    }

    /// Deep copy of a tree.
    pub fn clone(&self, tree: &Node) -> Node {
        tree.clone()
    }

    /// Parses both fragments and diffs them.
    pub fn diff_html(&self, left: &str, right: &str) -> Result<Option<Delta>> {
        let left = html::parse_str(left)?;
        let right = html::parse_str(right)?;
        Ok(self.diff(&left, &right))
    }

    /// Parses `markup`, applies `delta` and prints the result.
    pub fn patch_html(&self, markup: &str, delta: &Delta) -> Result<String> {
        let tree = html::parse_str(markup)?;
        Ok(html::print_to_string(&self.patch(&tree, delta)?))
    }

    /// Parses `markup`, undoes `delta` and prints the result.
    pub fn unpatch_html(&self, markup: &str, delta: &Delta) -> Result<String> {
        let tree = html::parse_str(markup)?;
        Ok(html::print_to_string(&self.unpatch(&tree, delta)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_thread_safe() {
        assert_send_sync::<DiffPatch>();
    }

    #[test]
    fn test_html_round_trip() {
        let dp = DiffPatch::new();
        let left = "<div>Hello World</div>";
        let right = "<div>Hello Universe</div>";
        let delta = dp.diff_html(left, right).unwrap().unwrap();
        assert_eq!(dp.patch_html(left, &delta).unwrap(), right);
        assert_eq!(dp.unpatch_html(right, &delta).unwrap(), left);
    }

    #[test]
    fn test_per_call_options_leave_instance_alone() {
        let dp = DiffPatch::new();
        let left = Node::from(Element::new("ul").with_children(["a", "b"]));
        let right = Node::from(Element::new("ul").with_children(["b", "a"]));

        let positional = DiffOptions::default().with_detect_move(false);
        let delta = dp.diff_with(&left, &right, &positional).unwrap();
        assert_eq!(delta.count(crate::ChangeKinds::MOVED), 0);

        let delta = dp.diff(&left, &right).unwrap();
        assert_eq!(delta.count(crate::ChangeKinds::MOVED), 2);
        assert!(dp.options().arrays.detect_move);
    }

    #[test]
    fn test_patch_with_reverse() {
        let dp = DiffPatch::new();
        let left = Node::from(Element::new("p").with_child("x"));
        let right = Node::from(Element::new("p").with_child("y"));
        let delta = dp.diff(&left, &right).unwrap();
        let back = dp
            .patch_with(&right, &delta, PatchOptions { reverse: true })
            .unwrap();
        assert_eq!(back, left);
        assert_eq!(dp.reverse(&dp.reverse(&delta)), delta);
    }
}
