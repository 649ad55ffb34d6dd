//! html-diffpatch - structural diff and patch for HTML fragments
//!
//! Parses HTML fragments into trees, computes flat path-addressed deltas
//! between two trees, and applies or inverts those deltas.
//!
//! # Overview
//!
//! A [`Delta`] maps a dotted [`Path`] (`children.0.attributes.class`) to a
//! [`Change`]: an addition, modification, deletion or move. Deltas are flat:
//! every changed location has its own entry, and they travel as JSON objects
//! in the jsondiffpatch array notation:
//!
//! - `[new]` - added
//! - `[old, new]` - modified
//! - `[old, 0, 0]` - deleted
//! - `["", from, 3]` - moved from index `from` to the index after `_`
//!
//! # Example
//!
//! ```
//! use html_diffpatch::{html, DiffPatch};
//!
//! let dp = DiffPatch::new();
//! let left = html::parse_str("<div>Hello World</div>").unwrap();
//! let right = html::parse_str("<div>Hello Universe</div>").unwrap();
//!
//! let delta = dp.diff(&left, &right).unwrap();
//! assert_eq!(delta.to_json_string().unwrap(), r#"{"children.0":["Hello World","Hello Universe"]}"#);
//!
//! assert_eq!(dp.patch(&left, &delta).unwrap(), right);
//! assert_eq!(dp.unpatch(&right, &delta).unwrap(), left);
//! ```

pub mod constants;
pub mod delta;
pub mod diff;
pub mod diffpatch;
pub mod error;
pub mod html;
pub mod node;

pub use delta::{Change, ChangeKinds, Delta, Path, PathToken};
pub use diff::{
    reverse, ArrayOptions, DiffOptions, Differ, PatchOptions, Patcher, PropertyFilter,
    TextDiffOptions,
};
pub use diffpatch::DiffPatch;
pub use error::{Error, Result};
pub use html::{HtmlParser, HtmlPrinter, HtmlPrinterOptions};
pub use node::{
    canonical_form, Attributes, DefaultObjectHash, DigestObjectHash, Element, Node, ObjectHash,
    Value,
};

/// Diffs two trees with default options.
pub fn diff(left: &Node, right: &Node) -> Option<Delta> {
    DiffPatch::new().diff(left, right)
}

/// Applies a delta with default options.
pub fn patch(tree: &Node, delta: &Delta) -> Result<Node> {
    DiffPatch::new().patch(tree, delta)
}

/// Undoes a delta with default options.
pub fn unpatch(tree: &Node, delta: &Delta) -> Result<Node> {
    DiffPatch::new().unpatch(tree, delta)
}

/// Deep copy of a tree.
pub fn clone(tree: &Node) -> Node {
    tree.clone()
}

/// Creates a [`DiffPatch`] with custom options.
pub fn create(options: DiffOptions) -> DiffPatch {
    DiffPatch::create(options)
}
