//! Diff generation.
//!
//! Walks two trees in parallel and records every difference as a flat
//! [`Delta`] entry.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::constants::{ATTRIBUTES_FIELD, CHILDREN_FIELD, TAG_NAME_FIELD};
use crate::delta::{Change, Delta, Path, PathToken};
use crate::node::{Element, Node, Value};

use super::options::DiffOptions;

/// Computes deltas between trees.
#[derive(Debug, Clone, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    /// Creates a differ with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a differ with the given options.
    pub fn with_options(options: DiffOptions) -> Self {
        Differ { options }
    }

    /// The options this differ was built with.
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Computes the delta turning `left` into `right`.
    ///
    /// Returns `None` when the trees are equal.
    pub fn diff(&self, left: &Node, right: &Node) -> Option<Delta> {
        let mut delta = Delta::new();
        self.diff_nodes(left, right, Path::root(), 0, &mut delta);
        debug!(entries = delta.len(), "diff complete");

        if delta.is_empty() {
            None
        } else {
            Some(delta)
        }
    }

    fn diff_nodes(&self, left: &Node, right: &Node, path: Path, depth: usize, delta: &mut Delta) {
        if left == right {
            return;
        }

        match (left, right) {
            (Node::Element(a), Node::Element(b)) if depth < self.options.max_depth => {
                self.diff_elements(a, b, &path, depth, delta);
            }
            (Node::Text(a), Node::Text(b)) => {
                let longest = a.chars().count().max(b.chars().count());
                if longest >= self.options.text_diff.min_length {
                    trace!(%path, chars = longest, "long text replaced whole");
                }
                delta.insert(path, Change::modified(a.as_str(), b.as_str()));
            }
            _ => {
                delta.insert(path, Change::modified(left, right));
            }
        }
    }

    fn diff_elements(
        &self,
        left: &Element,
        right: &Element,
        path: &Path,
        depth: usize,
        delta: &mut Delta,
    ) {
        if self.options.includes(TAG_NAME_FIELD, left) && left.tag_name != right.tag_name {
            delta.insert(
                path.child(TAG_NAME_FIELD),
                Change::modified(left.tag_name.as_str(), right.tag_name.as_str()),
            );
        }

        if self.options.includes(ATTRIBUTES_FIELD, left) && left.attributes != right.attributes {
            self.diff_attributes(left, right, &path.child(ATTRIBUTES_FIELD), delta);
        }

        if self.options.includes(CHILDREN_FIELD, left) && left.children != right.children {
            let children = path.child(CHILDREN_FIELD);
            if self.options.arrays.detect_move {
                self.diff_children_with_moves(&left.children, &right.children, &children, depth, delta);
            } else {
                self.diff_children_by_position(&left.children, &right.children, &children, depth, delta);
            }
        }
    }

    fn diff_attributes(&self, left: &Element, right: &Element, path: &Path, delta: &mut Delta) {
        for (name, old) in &left.attributes {
            if !self.options.includes(name, left) {
                continue;
            }
            match right.attributes.get(name) {
                None => {
                    delta.insert(path.child(name.as_str()), Change::Deleted(old.as_str().into()));
                }
                Some(new) if new != old => {
                    delta.insert(
                        path.child(name.as_str()),
                        Change::modified(old.as_str(), new.as_str()),
                    );
                }
                Some(_) => {}
            }
        }

        for (name, new) in &right.attributes {
            if !left.attributes.contains_key(name) && self.options.includes(name, left) {
                delta.insert(path.child(name.as_str()), Change::Added(new.as_str().into()));
            }
        }
    }

    /// Positional comparison: index `i` on the left against index `i` on the
    /// right.
    fn diff_children_by_position(
        &self,
        left: &[Node],
        right: &[Node],
        path: &Path,
        depth: usize,
        delta: &mut Delta,
    ) {
        for i in 0..left.len().max(right.len()) {
            match (left.get(i), right.get(i)) {
                (Some(l), Some(r)) => self.diff_nodes(l, r, path.child(i), depth + 1, delta),
                (Some(l), None) => {
                    delta.insert(path.child(i), Change::Deleted(Value::from(l)));
                }
                (None, Some(r)) => {
                    delta.insert(path.child(i), Change::Added(Value::from(r)));
                }
                (None, None) => {}
            }
        }
    }

    /// Hash-based comparison with move detection.
    ///
    /// Right items are matched in order to the lowest unconsumed left item
    /// with the same object hash. Moves are keyed by the right index
    /// (`_r`), deletions by the left index (`_l`), additions and nested
    /// changes by the right index (`r`).
    fn diff_children_with_moves(
        &self,
        left: &[Node],
        right: &[Node],
        path: &Path,
        depth: usize,
        delta: &mut Delta,
    ) {
        let hasher = &self.options.object_hash;

        let left_hashes: Vec<String> = left
            .iter()
            .enumerate()
            .map(|(i, node)| hasher.hash(node, i))
            .collect();
        let mut candidates: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (i, hash) in left_hashes.iter().enumerate() {
            candidates.entry(hash.as_str()).or_default().push(i);
        }

        let mut consumed = vec![false; left.len()];
        let mut sources: Vec<Option<usize>> = Vec::with_capacity(right.len());
        for (r, item) in right.iter().enumerate() {
            let hash = hasher.hash(item, r);
            let found = candidates.get(hash.as_str()).and_then(|indices| {
                indices
                    .iter()
                    .copied()
                    .find(|&l| !consumed[l] && self.matchable(&left[l], item, depth))
            });
            if let Some(l) = found {
                consumed[l] = true;
            }
            sources.push(found);
        }

        // A move marker `_r` must not coincide with the marker of a deleted
        // left item. Such moves become an addition plus a deletion.
        loop {
            let mut degraded = false;
            for r in 0..sources.len() {
                if let Some(l) = sources[r] {
                    if l != r && r < left.len() && !consumed[r] {
                        trace!(%path, from = l, to = r, "move degraded to delete and add");
                        sources[r] = None;
                        consumed[l] = false;
                        degraded = true;
                    }
                }
            }
            if !degraded {
                break;
            }
        }

        // Leftovers at the same index are compared in place.
        for (r, source) in sources.iter_mut().enumerate() {
            if source.is_none() && r < left.len() && !consumed[r] && same_shape(&left[r], &right[r]) {
                consumed[r] = true;
                *source = Some(r);
            }
        }

        for (r, source) in sources.iter().enumerate() {
            match *source {
                Some(l) => {
                    if l != r {
                        let value = self
                            .options
                            .arrays
                            .include_value_on_move
                            .then(|| Value::from(&left[l]));
                        delta.insert(
                            path.child(PathToken::Move(r)),
                            Change::Moved { from: l, value },
                        );
                    }
                    self.diff_nodes(&left[l], &right[r], path.child(r), depth + 1, delta);
                }
                None => {
                    delta.insert(path.child(r), Change::Added(Value::from(&right[r])));
                }
            }
        }

        for (l, node) in left.iter().enumerate() {
            if !consumed[l] {
                delta.insert(path.child(PathToken::Move(l)), Change::Deleted(Value::from(node)));
            }
        }
    }

    /// Whether a hash match may be recorded as the same item.
    ///
    /// Matched items that differ are diffed field by field, which needs two
    /// elements and room below the depth limit.
    fn matchable(&self, left: &Node, right: &Node, depth: usize) -> bool {
        left == right || (left.is_element() && right.is_element() && depth + 1 < self.options.max_depth)
    }
}

/// Two texts, or two elements with the same tag.
fn same_shape(left: &Node, right: &Node) -> bool {
    match (left, right) {
        (Node::Text(_), Node::Text(_)) => true,
        (Node::Element(a), Node::Element(b)) => a.tag_name == b.tag_name,
        _ => false,
    }
}
