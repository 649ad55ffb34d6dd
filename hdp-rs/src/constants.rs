//! Constants used throughout html-diffpatch.

/// Field name of an element's tag in delta paths.
pub const TAG_NAME_FIELD: &str = "tagName";

/// Field name of an element's attribute map in delta paths.
pub const ATTRIBUTES_FIELD: &str = "attributes";

/// Field name of an element's child list in delta paths.
pub const CHILDREN_FIELD: &str = "children";

/// Separator between path tokens in the string form of a path.
pub const PATH_SEPARATOR: char = '.';

/// Prefix of a move-marker token (`_3`).
pub const MOVE_MARKER: char = '_';

/// Trailing tag of a deletion descriptor `[old, 0, 0]`.
pub const DELETED_TAG: u64 = 0;

/// Trailing tag of a move descriptor `["", from, 3]`.
pub const MOVED_TAG: u64 = 3;

/// Default string length from which a text change is reported as a
/// candidate for finer-grained text diffing.
pub const TEXT_DIFF_MIN_LENGTH: usize = 60;

/// Default depth at which the differ stops recursing and replaces the
/// remaining subtree whole. Sized for a 2 MiB thread stack in debug builds.
pub const MAX_DIFF_DEPTH: usize = 128;

/// Maximum element nesting accepted by the parser.
///
/// Every element nests two JSON containers (the object and its child array)
/// under the delta's own two, so any delta between parsed trees stays below
/// serde_json's default recursion limit of 128.
pub const MAX_PARSE_DEPTH: usize = 60;

/// Elements that never have children in HTML.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Returns true if `tag` (lowercase) is an HTML void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}
