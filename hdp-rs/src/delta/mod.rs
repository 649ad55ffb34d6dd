//! Delta encoding.
//!
//! A [`Delta`] is a flat map from [`Path`] to [`Change`]. It has no nested
//! deltas: every changed location has its own entry. Entries keep the order
//! the differ produced them in; equality ignores that order.

mod change;
mod path;

pub use change::{Change, ChangeKinds};
pub use path::{Path, PathToken};

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Flat path-to-change map describing how to turn one tree into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    entries: IndexMap<Path, Change>,
}

impl Delta {
    /// Creates an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a change, returning the one previously stored at `path`.
    pub fn insert(&mut self, path: Path, change: Change) -> Option<Change> {
        self.entries.insert(path, change)
    }

    /// The change at `path`.
    pub fn get(&self, path: &Path) -> Option<&Change> {
        self.entries.get(path)
    }

    /// The change at the path written as a string.
    pub fn get_str(&self, path: &str) -> Option<&Change> {
        self.entries.get(&Path::from(path))
    }

    /// Returns true if there is a change at the path written as a string.
    pub fn contains_path(&self, path: &str) -> bool {
        self.get_str(path).is_some()
    }

    /// Removes the change at `path`, keeping the order of the rest.
    pub fn remove(&mut self, path: &Path) -> Option<Change> {
        self.entries.shift_remove(path)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Change)> {
        self.entries.iter()
    }

    /// Iterates over paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }

    /// The set of change kinds present.
    pub fn kinds(&self) -> ChangeKinds {
        self.entries
            .values()
            .fold(ChangeKinds::empty(), |acc, change| acc | change.kind())
    }

    /// Number of entries of the given kinds.
    pub fn count(&self, kinds: ChangeKinds) -> usize {
        self.entries
            .values()
            .filter(|change| kinds.intersects(change.kind()))
            .count()
    }

    /// Depth of the deepest path.
    pub fn max_depth(&self) -> usize {
        self.entries.keys().map(Path::depth).max().unwrap_or(0)
    }

    /// Encodes the delta as a JSON object keyed by path strings.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Encodes the delta as compact JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encodes the delta as indented JSON.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a delta from JSON text.
    ///
    /// Nesting is bounded by serde_json's recursion limit, which admits
    /// element values up to [`MAX_PARSE_DEPTH`](crate::constants::MAX_PARSE_DEPTH)
    /// levels deep.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Decodes a delta from a JSON value.
    ///
    /// Malformed descriptors are reported with the path they were found at.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::malformed("", "a delta must be a JSON object"));
        };

        let mut delta = Delta::new();
        for (key, raw) in map {
            let serde_json::Value::Array(items) = raw else {
                return Err(Error::malformed(key, "a change descriptor must be an array"));
            };
            let change = Change::from_wire(items).map_err(|reason| Error::malformed(&key, reason))?;
            delta.insert(Path::from(key.as_str()), change);
        }
        Ok(delta)
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = (&'a Path, &'a Change);
    type IntoIter = indexmap::map::Iter<'a, Path, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Delta {
    type Item = (Path, Change);
    type IntoIter = indexmap::map::IntoIter<Path, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(Path, Change)> for Delta {
    fn from_iter<I: IntoIterator<Item = (Path, Change)>>(iter: I) -> Self {
        Delta {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Path, Change)> for Delta {
    fn extend<I: IntoIterator<Item = (Path, Change)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, change) in &self.entries {
            map.serialize_entry(&path.to_string(), change)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Delta::from_json_value(value).map_err(D::Error::custom)
    }
}
