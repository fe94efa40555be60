//! Path-based field extraction from raw game documents.
//!
//! Upstream documents are loosely shaped: any nested object may be missing,
//! null, or of an unexpected type. Lookups through a [`FieldPath`] treat all
//! of those cases as an absent value instead of failing.

use serde_json::Value as JsonValue;
use std::fmt;

use crate::entity::Id;

/// Represents a path to a field in a JSON document
///
/// # Examples
///
/// - `map.id` - the `id` of the nested `map` object
/// - `match.serie.tier` - two levels deep
/// - `rounds.[0].round` - the `round` of the first element of `rounds`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// The raw path string
    pub raw: String,
    /// Parsed path segments
    pub segments: Vec<PathSegment>,
}

/// A segment in a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field (e.g., "map", "id")
    Field(String),
    /// An array index (e.g., [0], [5])
    Index(usize),
}

impl FieldPath {
    /// Parse a field path with a given delimiter
    ///
    /// # Example
    ///
    /// ```
    /// use cs2_game_parser::FieldPath;
    ///
    /// let path = FieldPath::parse("match.league.id", ".");
    /// assert_eq!(path.segments.len(), 3);
    /// ```
    pub fn parse(path: &str, delimiter: &str) -> Self {
        let segments = path
            .split(delimiter)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('[') && s.ends_with(']') {
                    if let Ok(index) = s[1..s.len() - 1].parse::<usize>() {
                        return PathSegment::Index(index);
                    }
                }

                PathSegment::Field(s.to_string())
            })
            .collect();

        Self {
            raw: path.to_string(),
            segments,
        }
    }

    /// Create a field path from a dotted string (common format)
    pub fn from_dotted(path: &str) -> Self {
        Self::parse(path, ".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Trait for documents that can be addressed by field path
pub trait Extractor {
    /// Extract the value at the given field path
    ///
    /// Returns `None` when any segment is missing or addresses the wrong kind
    /// of value. A JSON `null` is returned as `Some(&Null)`.
    fn extract(&self, path: &FieldPath) -> Option<&JsonValue>;

    /// Extract an identifier, see [`Id::from_json`]
    fn extract_id(&self, path: &FieldPath) -> Option<Id> {
        self.extract(path).and_then(Id::from_json)
    }

    /// Extract a string value
    fn extract_str(&self, path: &FieldPath) -> Option<&str> {
        self.extract(path).and_then(JsonValue::as_str)
    }

    /// Extract an integer, accepting whole floats and numeric strings
    fn extract_int(&self, path: &FieldPath) -> Option<i64> {
        match self.extract(path)? {
            JsonValue::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Extractor for JsonValue {
    fn extract(&self, path: &FieldPath) -> Option<&JsonValue> {
        let mut current = self;
        for segment in &path.segments {
            current = match segment {
                PathSegment::Field(name) => current.as_object()?.get(name)?,
                PathSegment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        Some(current)
    }
}
