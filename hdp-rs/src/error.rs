//! Error types for html-diffpatch.

use thiserror::Error;

/// Result type alias for html-diffpatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing markup or applying a delta.
///
/// Diffing and reversing never fail; only the parser and the patcher
/// return these.
#[derive(Error, Debug)]
pub enum Error {
    /// Markup could not be turned into a tree.
    #[error("HTML parse error: {0}")]
    Parse(String),

    /// Markup nests deeper than the parser accepts.
    #[error("nesting exceeds the maximum depth of {0}")]
    DepthLimit(usize),

    /// A change descriptor has an unknown shape or does not fit its location.
    #[error("malformed delta at `{path}`: {reason}")]
    MalformedDelta { path: String, reason: String },

    /// A move refers to a source index that is not in the array.
    #[error("move at `{path}` reads index {from} but the array has {len} items")]
    MoveOutOfRange { path: String, from: usize, len: usize },

    /// An index token addresses a position past the end of an array.
    #[error("index {index} at `{path}` is out of range for {len} items")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// A path does not resolve to a location in the tree.
    #[error("path `{path}` does not resolve: {reason}")]
    InvalidPath { path: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Delta (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(path: impl ToString, reason: impl Into<String>) -> Self {
        Error::MalformedDelta {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_path(path: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
