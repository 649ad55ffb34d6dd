//! Change descriptors and their wire form.
//!
//! | kind         | wire form           |
//! |--------------|---------------------|
//! | addition     | `[new]`             |
//! | modification | `[old, new]`        |
//! | deletion     | `[old, 0, 0]`       |
//! | move         | `["", from, 3]`     |
//!
//! A move may carry the moved value in its first slot when the differ is
//! configured to include it.

use bitflags::bitflags;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{DELETED_TAG, MOVED_TAG};
use crate::node::Value;

bitflags! {
    /// Set of change kinds present in a delta.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeKinds: u8 {
        /// A value exists only on the right.
        const ADDED = 1;
        /// A value differs between the sides.
        const MODIFIED = 1 << 1;
        /// A value exists only on the left.
        const DELETED = 1 << 2;
        /// An array item changed position.
        const MOVED = 1 << 3;
    }
}

/// One change at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The value did not exist on the left.
    Added(Value),
    /// The value exists on both sides and differs.
    Modified { old: Value, new: Value },
    /// The value existed only on the left.
    Deleted(Value),
    /// The array item at input index `from` lands at the index of the
    /// path's move marker.
    Moved { from: usize, value: Option<Value> },
}

impl Change {
    /// Creates a modification.
    pub fn modified(old: impl Into<Value>, new: impl Into<Value>) -> Self {
        Change::Modified {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Creates a move without the moved value.
    pub fn moved(from: usize) -> Self {
        Change::Moved { from, value: None }
    }

    /// The kind of this change.
    pub fn kind(&self) -> ChangeKinds {
        match self {
            Change::Added(_) => ChangeKinds::ADDED,
            Change::Modified { .. } => ChangeKinds::MODIFIED,
            Change::Deleted(_) => ChangeKinds::DELETED,
            Change::Moved { .. } => ChangeKinds::MOVED,
        }
    }

    /// Decodes the wire form. The error names what is wrong with the shape.
    pub fn from_wire(items: Vec<serde_json::Value>) -> Result<Self, String> {
        let mut items = items.into_iter();
        match (items.next(), items.next(), items.next(), items.next()) {
            (Some(new), None, None, None) => Ok(Change::Added(decode_value(new)?)),
            (Some(old), Some(new), None, None) => Ok(Change::Modified {
                old: decode_value(old)?,
                new: decode_value(new)?,
            }),
            (Some(first), Some(second), Some(tag), None) => match tag.as_u64() {
                Some(DELETED_TAG) => {
                    if second.as_u64() != Some(0) {
                        return Err(format!(
                            "deletion must be [old, 0, 0], second slot is {second}"
                        ));
                    }
                    Ok(Change::Deleted(decode_value(first)?))
                }
                Some(MOVED_TAG) => {
                    let from = second
                        .as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| format!("move source must be an index, got {second}"))?;
                    let value = match first {
                        serde_json::Value::String(ref s) if s.is_empty() => None,
                        other => Some(decode_value(other)?),
                    };
                    Ok(Change::Moved { from, value })
                }
                _ => Err(format!("unknown descriptor tag {tag}")),
            },
            (None, ..) => Err("empty descriptor".to_string()),
            _ => Err("descriptor has more than three items".to_string()),
        }
    }
}

fn decode_value(raw: serde_json::Value) -> Result<Value, String> {
    let value: Value = serde_json::from_value(raw).map_err(|e| format!("invalid value: {e}"))?;
    if let Value::Element(element) = &value {
        if let Some(tag) = element.find_invalid_tag_name() {
            return Err(format!("invalid tag name {tag:?}: must be non-empty and lowercase"));
        }
    }
    Ok(value)
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Change::Added(new) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(new)?;
                seq.end()
            }
            Change::Modified { old, new } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(old)?;
                seq.serialize_element(new)?;
                seq.end()
            }
            Change::Deleted(old) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(old)?;
                seq.serialize_element(&0u64)?;
                seq.serialize_element(&DELETED_TAG)?;
                seq.end()
            }
            Change::Moved { from, value } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                match value {
                    Some(v) => seq.serialize_element(v)?,
                    None => seq.serialize_element("")?,
                }
                seq.serialize_element(from)?;
                seq.serialize_element(&MOVED_TAG)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<serde_json::Value>::deserialize(deserializer)?;
        Change::from_wire(items).map_err(D::Error::custom)
    }
}
