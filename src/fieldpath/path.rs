//! Field path type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// FieldPath is an ordered sequence of map keys leading to a field.
///
/// Lists met along the way are fanned out, so a path names a field in every
/// element of a list rather than a single index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Creates a new empty path.
    pub fn new() -> Self {
        FieldPath {
            segments: Vec::new(),
        }
    }

    /// Creates a path from its segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a slice of the path segments.
    pub fn as_slice(&self) -> &[String] {
        &self.segments
    }

    /// Creates a new path with the given segment appended.
    pub fn with(&self, segment: impl Into<String>) -> Self {
        let mut new_path = self.clone();
        new_path.segments.push(segment.into());
        new_path
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    /// Parses a `/`-separated path such as `spec/template/metadata/labels`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldPath::from_segments(
            s.split('/').filter(|segment| !segment.is_empty()),
        ))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(path) => path,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FieldPath::from(s.as_str()))
    }
}
