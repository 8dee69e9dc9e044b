//! Output records.

use serde::{Deserialize, Serialize};

/// One heading of the extracted outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level (1 = top level)
    pub level: u32,

    /// Cleaned heading text
    pub text: String,

    /// Page index (0-based)
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: u32, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// The title and outline extracted from one document.
///
/// Serializes to exactly two fields, `title` and `outline`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultRecord {
    /// Document title (empty when no candidate was found)
    pub title: String,

    /// Outline entries in reading order
    pub outline: Vec<OutlineEntry>,
}

impl ResultRecord {
    /// Create a new record.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// Check if neither a title nor any outline entry was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.outline.is_empty()
    }
}
