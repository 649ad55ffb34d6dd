//! Patch application.
//!
//! Applies a [`Delta`] to a tree to reconstruct the other side. The input
//! tree is never modified; every call works on a copy.
//!
//! Entries are applied deepest first, grouped by the location that holds
//! them. Child lists are rebuilt in one pass per list so that moves,
//! insertions and deletions see the original input indices.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::constants::{ATTRIBUTES_FIELD, CHILDREN_FIELD, TAG_NAME_FIELD};
use crate::delta::{Change, Delta, Path, PathToken};
use crate::error::{Error, Result};
use crate::node::{is_valid_tag_name, Attributes, Element, Node, Value};

use super::move_table::MoveTable;
use super::options::PatchOptions;
use super::reverse::reverse;

/// Applies deltas to trees.
#[derive(Debug, Clone, Default)]
pub struct Patcher {
    options: PatchOptions,
}

/// Entries that share a parent location.
type Group<'d> = Vec<(&'d PathToken, &'d Change)>;

enum Target<'a> {
    Node(&'a mut Node),
    Attributes(&'a mut Attributes),
    Children(&'a mut Vec<Node>),
}

enum Placement {
    Input(usize),
    New(Node),
}

impl Patcher {
    /// Creates a patcher with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a patcher with the given options.
    pub fn with_options(options: PatchOptions) -> Self {
        Patcher { options }
    }

    /// The options this patcher was built with.
    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Applies `delta` to `tree` and returns the patched copy.
    ///
    /// With [`PatchOptions::reverse`] set, the inverse of `delta` is applied
    /// instead.
    pub fn apply(&self, tree: &Node, delta: &Delta) -> Result<Node> {
        if self.options.reverse {
            return apply_delta(tree, &reverse(delta));
        }
        apply_delta(tree, delta)
    }

    /// Applies the inverse of `delta`, turning a patched tree back into the
    /// tree the delta was computed from.
    pub fn unapply(&self, tree: &Node, delta: &Delta) -> Result<Node> {
        apply_delta(tree, &reverse(delta))
    }
}

fn apply_delta(tree: &Node, delta: &Delta) -> Result<Node> {
    let mut root = tree.clone();
    if delta.is_empty() {
        return Ok(root);
    }
    debug!(entries = delta.len(), "applying delta");

    let moves = MoveTable::from_delta(delta);
    let mut root_change = None;
    let mut levels: BTreeMap<usize, IndexMap<Path, Group<'_>>> = BTreeMap::new();
    for (path, change) in delta {
        match (path.parent(), path.last()) {
            (Some(parent), Some(last)) => levels
                .entry(path.depth())
                .or_default()
                .entry(parent)
                .or_default()
                .push((last, change)),
            _ => root_change = Some(change),
        }
    }

    for (depth, groups) in levels.into_iter().rev() {
        trace!(depth, groups = groups.len(), "applying level");
        for (parent, entries) in groups {
            apply_group(&mut root, &parent, entries, &moves)?;
        }
    }

    if let Some(change) = root_change {
        root = match change {
            Change::Modified { new, .. } | Change::Added(new) => to_node(new, &Path::root())?,
            Change::Deleted(_) | Change::Moved { .. } => {
                return Err(Error::malformed("", "the root can only be replaced"));
            }
        };
    }

    Ok(root)
}

/// Converts a delta value into a node, checking the tag names it carries.
fn to_node(value: &Value, path: &Path) -> Result<Node> {
    if let Value::Element(element) = value {
        if let Some(tag) = element.find_invalid_tag_name() {
            return Err(Error::malformed(
                path,
                format!("invalid tag name {tag:?}: must be non-empty and lowercase"),
            ));
        }
    }
    Ok(value.clone().into_node())
}

fn apply_group(root: &mut Node, parent: &Path, entries: Group<'_>, moves: &MoveTable) -> Result<()> {
    match resolve(root, parent, moves)? {
        Target::Node(Node::Element(element)) => apply_fields(element, parent, entries),
        Target::Node(Node::Text(_)) => Err(Error::invalid_path(parent, "text nodes have no fields")),
        Target::Attributes(attributes) => apply_attributes(attributes, parent, entries),
        Target::Children(children) => apply_children(children, parent, entries, moves),
    }
}

/// Walks `path` from the root. Item indices are output indices and are
/// mapped back to the input item through the moves of their list.
fn resolve<'a>(root: &'a mut Node, path: &Path, moves: &MoveTable) -> Result<Target<'a>> {
    let mut cursor = Target::Node(root);

    for (k, token) in path.tokens().iter().enumerate() {
        cursor = match (cursor, token) {
            (Target::Node(node), PathToken::Field(name)) => {
                let Node::Element(element) = node else {
                    return Err(Error::invalid_path(path.prefix(k + 1), "text nodes have no fields"));
                };
                match name.as_str() {
                    ATTRIBUTES_FIELD => Target::Attributes(&mut element.attributes),
                    CHILDREN_FIELD => Target::Children(&mut element.children),
                    _ => {
                        return Err(Error::invalid_path(
                            path.prefix(k + 1),
                            format!("`{name}` has no nested locations"),
                        ));
                    }
                }
            }
            (Target::Children(children), PathToken::Index(output)) => {
                let index = moves.source(&path.prefix(k), *output);
                let len = children.len();
                let node = children.get_mut(index).ok_or_else(|| Error::IndexOutOfRange {
                    path: path.prefix(k + 1).to_string(),
                    index,
                    len,
                })?;
                Target::Node(node)
            }
            (Target::Children(_), _) => {
                return Err(Error::invalid_path(
                    path.prefix(k + 1),
                    "child lists are entered by plain index",
                ));
            }
            (Target::Attributes(_), _) => {
                return Err(Error::invalid_path(
                    path.prefix(k + 1),
                    "attribute values have no nested locations",
                ));
            }
            (Target::Node(_), _) => {
                return Err(Error::invalid_path(
                    path.prefix(k + 1),
                    "nodes are entered by field name",
                ));
            }
        };
    }

    Ok(cursor)
}

fn apply_fields(element: &mut Element, parent: &Path, entries: Group<'_>) -> Result<()> {
    for (token, change) in entries {
        let path = parent.child(token.clone());
        let PathToken::Field(name) = token else {
            return Err(Error::invalid_path(&path, "element fields are addressed by name"));
        };
        if name != TAG_NAME_FIELD {
            return Err(Error::malformed(&path, format!("`{name}` cannot be replaced whole")));
        }

        match change {
            Change::Modified { new, .. } | Change::Added(new) => {
                let Value::String(tag) = new else {
                    return Err(Error::malformed(&path, "tag name must be a string"));
                };
                if !is_valid_tag_name(tag) {
                    return Err(Error::malformed(&path, "tag name must be non-empty and lowercase"));
                }
                element.tag_name = tag.clone();
            }
            Change::Deleted(_) | Change::Moved { .. } => {
                return Err(Error::malformed(&path, "tag name can only be replaced"));
            }
        }
    }
    Ok(())
}

fn apply_attributes(attributes: &mut Attributes, parent: &Path, entries: Group<'_>) -> Result<()> {
    for (token, change) in entries {
        let name = token.as_key();
        match change {
            Change::Added(value) | Change::Modified { new: value, .. } => {
                let Some(value) = value.as_str() else {
                    return Err(Error::malformed(
                        parent.child(token.clone()),
                        "attribute values must be strings",
                    ));
                };
                attributes.insert(name.into_owned(), value.to_string());
            }
            Change::Deleted(_) => {
                if attributes.shift_remove(name.as_ref()).is_none() {
                    return Err(Error::malformed(
                        parent.child(token.clone()),
                        "deleted attribute is not present",
                    ));
                }
            }
            Change::Moved { .. } => {
                return Err(Error::malformed(
                    parent.child(token.clone()),
                    "attributes cannot move",
                ));
            }
        }
    }
    Ok(())
}

/// Rebuilds one child list.
///
/// Moves and additions name output indices, deletions name input indices.
/// Input items that are neither moved nor deleted keep their index.
fn apply_children(
    children: &mut Vec<Node>,
    array: &Path,
    entries: Group<'_>,
    moves: &MoveTable,
) -> Result<()> {
    let len = children.len();
    let mut removed = vec![false; len];
    let mut placements: Vec<(usize, Placement)> = Vec::new();

    for (token, change) in entries {
        let path = array.child(token.clone());
        match (token, change) {
            (PathToken::Index(output), Change::Modified { new, .. }) => {
                let index = moves.source(array, *output);
                let slot = children.get_mut(index).ok_or_else(|| Error::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len,
                })?;
                *slot = to_node(new, &path)?;
            }
            (PathToken::Move(output), Change::Moved { from, .. }) => {
                if *from >= len {
                    return Err(Error::MoveOutOfRange {
                        path: path.to_string(),
                        from: *from,
                        len,
                    });
                }
                mark_removed(&mut removed, *from, &path)?;
                placements.push((*output, Placement::Input(*from)));
            }
            (PathToken::Index(output) | PathToken::Move(output), Change::Added(value)) => {
                placements.push((*output, Placement::New(to_node(value, &path)?)));
            }
            (PathToken::Index(index) | PathToken::Move(index), Change::Deleted(_)) => {
                if *index >= len {
                    return Err(Error::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        len,
                    });
                }
                mark_removed(&mut removed, *index, &path)?;
            }
            (PathToken::Move(_), Change::Modified { .. }) => {
                return Err(Error::malformed(&path, "move markers cannot carry a modification"));
            }
            (PathToken::Index(_), Change::Moved { .. }) => {
                return Err(Error::malformed(&path, "moves must be keyed by a move marker"));
            }
            (PathToken::Field(_), _) => {
                return Err(Error::invalid_path(&path, "child lists are addressed by index"));
            }
        }
    }

    if placements.is_empty() && !removed.contains(&true) {
        return Ok(());
    }

    let kept = removed.iter().filter(|r| !**r).count();
    let out_len = kept + placements.len();
    trace!(%array, from = len, to = out_len, "rebuilding child list");

    let mut input: Vec<Option<Node>> = std::mem::take(children).into_iter().map(Some).collect();
    let mut output: Vec<Option<Node>> = vec![None; out_len];

    for (index, placement) in placements {
        if index >= out_len {
            return Err(Error::IndexOutOfRange {
                path: array.child(index).to_string(),
                index,
                len: out_len,
            });
        }
        if output[index].is_some() {
            return Err(Error::malformed(array.child(index), "two changes fill the same index"));
        }
        let node = match placement {
            Placement::New(node) => node,
            Placement::Input(from) => input[from]
                .take()
                .ok_or_else(|| Error::malformed(array.child(index), "moved item already taken"))?,
        };
        output[index] = Some(node);
    }

    for (i, item) in input.into_iter().enumerate() {
        if removed[i] {
            continue;
        }
        if i >= out_len || output[i].is_some() {
            return Err(Error::malformed(
                array.child(i),
                "an unchanged item collides with a moved or added one",
            ));
        }
        output[i] = item;
    }

    *children = output
        .into_iter()
        .enumerate()
        .map(|(k, item)| item.ok_or_else(|| Error::malformed(array.child(k), "no item lands here")))
        .collect::<Result<_>>()?;
    Ok(())
}

fn mark_removed(removed: &mut [bool], index: usize, path: &Path) -> Result<()> {
    if removed[index] {
        return Err(Error::malformed(path, format!("input item {index} is removed twice")));
    }
    removed[index] = true;
    Ok(())
}
