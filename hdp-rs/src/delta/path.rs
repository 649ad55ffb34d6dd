//! Paths addressing locations inside a tree.
//!
//! A path is a sequence of typed tokens. Its string form joins the tokens
//! with dots: `children._2`, `children.0.attributes.class`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{MOVE_MARKER, PATH_SEPARATOR};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathToken {
    /// An element field (`tagName`, `attributes`, `children`) or an
    /// attribute name.
    Field(String),
    /// A plain array index.
    Index(usize),
    /// A move-marker index, written `_N`.
    Move(usize),
}

impl PathToken {
    /// Creates a field token.
    pub fn field(name: impl Into<String>) -> Self {
        PathToken::Field(name.into())
    }

    /// The numeric index of an `Index` or `Move` token.
    pub fn index(&self) -> Option<usize> {
        match self {
            PathToken::Index(i) | PathToken::Move(i) => Some(*i),
            PathToken::Field(_) => None,
        }
    }

    /// The token read as a map key.
    ///
    /// Numeric tokens come back as their string form, so an attribute named
    /// `1` survives a trip through the string encoding.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathToken::Field(name) => Cow::Borrowed(name),
            PathToken::Index(i) => Cow::Owned(i.to_string()),
            PathToken::Move(i) => Cow::Owned(format!("{MOVE_MARKER}{i}")),
        }
    }

    fn parse(raw: &str) -> Self {
        if let Some(index) = parse_index(raw) {
            return PathToken::Index(index);
        }
        if let Some(index) = raw.strip_prefix(MOVE_MARKER).and_then(parse_index) {
            return PathToken::Move(index);
        }
        PathToken::Field(raw.to_string())
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // `01` would not print back the same way.
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Field(name) => {
                for c in name.chars() {
                    if c == PATH_SEPARATOR || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            PathToken::Index(i) => write!(f, "{i}"),
            PathToken::Move(i) => write!(f, "{MOVE_MARKER}{i}"),
        }
    }
}

/// Reads the token the same way the string form of a path is read, so an
/// attribute named `2` compares equal after a round trip.
impl From<&str> for PathToken {
    fn from(raw: &str) -> Self {
        PathToken::parse(raw)
    }
}

impl From<usize> for PathToken {
    fn from(index: usize) -> Self {
        PathToken::Index(index)
    }
}

/// A location in a tree, as a sequence of tokens. The empty path is the
/// root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<PathToken>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Creates a path from tokens.
    pub fn new(tokens: Vec<PathToken>) -> Self {
        Path(tokens)
    }

    /// The tokens of this path.
    pub fn tokens(&self) -> &[PathToken] {
        &self.0
    }

    /// Number of tokens. Patches are applied deepest first.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last token, if any.
    pub fn last(&self) -> Option<&PathToken> {
        self.0.last()
    }

    /// This path extended by one token.
    pub fn child(&self, token: impl Into<PathToken>) -> Path {
        let mut tokens = Vec::with_capacity(self.0.len() + 1);
        tokens.extend_from_slice(&self.0);
        tokens.push(token.into());
        Path(tokens)
    }

    /// The path without its last token. The root has no parent.
    pub fn parent(&self) -> Option<Path> {
        match self.0.split_last() {
            Some((_, init)) => Some(Path(init.to_vec())),
            None => None,
        }
    }

    /// The first `len` tokens as a path.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Returns a copy with the token at `position` replaced.
    pub fn with_token(&self, position: usize, token: PathToken) -> Path {
        let mut tokens = self.0.clone();
        tokens[position] = token;
        Path(tokens)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Path::root());
        }

        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut escaped = false;
        for c in s.chars() {
            if escaped {
                current.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == PATH_SEPARATOR {
                tokens.push(PathToken::parse(&current));
                current.clear();
            } else {
                current.push(c);
            }
        }
        if escaped {
            current.push('\\');
        }
        tokens.push(PathToken::parse(&current));
        Ok(Path(tokens))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(path) => path,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Path::from(s.as_str()))
    }
}
