//! Detected spans of sensitive content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step from a field value down to a nested leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    /// Object member
    Key(String),
    /// Array element
    Index(usize),
    /// The string at this point holds JSON text; descend into the decoded value
    Decoded,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Decoded => write!(f, "<json>"),
        }
    }
}

/// A flagged span within the canonical string form of a value.
///
/// Offsets are byte offsets into the value addressed by `path` (the field
/// value itself when `path` is empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Upper-case entity type (`REDACT`, `EMAIL_ADDRESS`, `SENSITIVE_KEY`, ...).
    pub entity_type: String,
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Confidence in `[0, 1]`.
    pub score: f64,
    /// Location of the scanned leaf inside a structured value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
}

impl Detection {
    /// Create a detection on the top-level value.
    pub fn new(entity_type: impl Into<String>, start: usize, end: usize, score: f64) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score: score.clamp(0.0, 1.0),
            path: Vec::new(),
        }
    }

    /// Create a detection covering a whole value of `len` bytes.
    pub fn whole(entity_type: impl Into<String>, len: usize) -> Self {
        Self::new(entity_type, 0, len, 1.0)
    }

    /// Attach a nested path.
    pub fn at(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// Returns whether this detection covers all of a value of `len` bytes.
    pub fn covers(&self, len: usize) -> bool {
        self.start == 0 && self.end >= len
    }

    /// Check the span against the string it was computed on.
    ///
    /// Empty spans are only valid as whole-value detections of an empty
    /// string.
    pub fn is_valid_for(&self, text: &str) -> bool {
        if self.end > text.len() || self.start > self.end {
            return false;
        }
        if self.start == self.end && !text.is_empty() {
            return false;
        }
        text.is_char_boundary(self.start) && text.is_char_boundary(self.end)
    }

    /// Render the path for structured logs (`.user.emails[0]`).
    pub fn path_display(&self) -> String {
        self.path.iter().map(|s| s.to_string()).collect()
    }
}
