//! Configuration for the differ and the patcher.

use std::fmt;
use std::sync::Arc;

use crate::constants::{MAX_DIFF_DEPTH, TEXT_DIFF_MIN_LENGTH};
use crate::node::{DefaultObjectHash, Element, ObjectHash};

/// Decides whether a field or attribute takes part in the diff.
///
/// `name` is an element field (`tagName`, `attributes`, `children`) or an
/// attribute name; `context` is the left-hand element that owns it.
/// Closures with the matching signature implement this trait.
pub trait PropertyFilter: Send + Sync {
    /// Returns true to diff `name`.
    fn include(&self, name: &str, context: &Element) -> bool;
}

impl<F> PropertyFilter for F
where
    F: Fn(&str, &Element) -> bool + Send + Sync,
{
    fn include(&self, name: &str, context: &Element) -> bool {
        self(name, context)
    }
}

/// Options for child-list diffing.
#[derive(Debug, Clone, Copy)]
pub struct ArrayOptions {
    /// Match items by object hash and record moves.
    pub detect_move: bool,
    /// Store the moved value in move descriptors.
    pub include_value_on_move: bool,
}

impl Default for ArrayOptions {
    fn default() -> Self {
        ArrayOptions {
            detect_move: true,
            include_value_on_move: false,
        }
    }
}

/// Options reserved for finer-grained text diffing.
///
/// Strings are always replaced whole; changes at or above `min_length`
/// characters are reported at trace level.
#[derive(Debug, Clone, Copy)]
pub struct TextDiffOptions {
    pub min_length: usize,
}

impl Default for TextDiffOptions {
    fn default() -> Self {
        TextDiffOptions {
            min_length: TEXT_DIFF_MIN_LENGTH,
        }
    }
}

/// Differ configuration. Fixed once a [`Differ`](super::Differ) is built.
#[derive(Clone)]
pub struct DiffOptions {
    /// Identity function for child-list items.
    pub object_hash: Arc<dyn ObjectHash>,
    pub arrays: ArrayOptions,
    pub text_diff: TextDiffOptions,
    /// Fields and attributes to skip; `None` diffs everything.
    pub property_filter: Option<Arc<dyn PropertyFilter>>,
    /// Nesting depth past which subtrees are replaced whole.
    pub max_depth: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            object_hash: Arc::new(DefaultObjectHash),
            arrays: ArrayOptions::default(),
            text_diff: TextDiffOptions::default(),
            property_filter: None,
            max_depth: MAX_DIFF_DEPTH,
        }
    }
}

impl DiffOptions {
    /// Replaces the object hash.
    pub fn with_object_hash(mut self, hash: impl ObjectHash + 'static) -> Self {
        self.object_hash = Arc::new(hash);
        self
    }

    /// Turns move detection on or off.
    pub fn with_detect_move(mut self, detect_move: bool) -> Self {
        self.arrays.detect_move = detect_move;
        self
    }

    /// Stores moved values in move descriptors.
    pub fn with_include_value_on_move(mut self, include: bool) -> Self {
        self.arrays.include_value_on_move = include;
        self
    }

    /// Sets the text length reported as a fine-grained diff candidate.
    pub fn with_text_diff_min_length(mut self, min_length: usize) -> Self {
        self.text_diff.min_length = min_length;
        self
    }

    /// Installs a property filter.
    pub fn with_property_filter(mut self, filter: impl PropertyFilter + 'static) -> Self {
        self.property_filter = Some(Arc::new(filter));
        self
    }

    /// Sets the recursion bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) fn includes(&self, name: &str, context: &Element) -> bool {
        self.property_filter
            .as_ref()
            .is_none_or(|filter| filter.include(name, context))
    }
}

impl fmt::Debug for DiffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("arrays", &self.arrays)
            .field("text_diff", &self.text_diff)
            .field("property_filter", &self.property_filter.is_some())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// Patcher configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchOptions {
    /// Apply the inverse of the given delta.
    pub reverse: bool,
}
