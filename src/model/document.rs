//! Document-level types.

use super::PageText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the resolvers know about one PDF document.
///
/// Built once per document and then only read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageTextModel {
    name: String,
    pages: Vec<PageText>,
    metadata: Metadata,
    native_outline: Vec<NativeOutlineEntry>,
}

impl PageTextModel {
    /// Create an empty model for the document identified by `name`
    /// (the input file stem).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a page. Its index is set to its position in the document.
    pub fn with_page(mut self, page: PageText) -> Self {
        let index = self.pages.len();
        let page = if page.index == index {
            page
        } else {
            PageText::new(index)
                .with_runs(page.runs)
                .with_markdown(page.markdown)
        };
        self.pages.push(page);
        self
    }

    /// Append several pages.
    pub fn with_pages(self, pages: impl IntoIterator<Item = PageText>) -> Self {
        pages.into_iter().fold(self, |model, page| model.with_page(page))
    }

    /// Set the document metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the native outline entries.
    pub fn with_native_outline(mut self, entries: Vec<NativeOutlineEntry>) -> Self {
        self.native_outline = entries;
        self
    }

    /// Document identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pages in document order.
    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    /// Get a page by index (0-based).
    pub fn page(&self, index: usize) -> Option<&PageText> {
        self.pages.get(index)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Native outline entries in source order.
    pub fn native_outline(&self) -> &[NativeOutlineEntry] {
        &self.native_outline
    }

    /// Check if the document has no visible text on any page.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(PageText::is_blank)
    }
}

/// Document metadata as a key-value mapping (e.g., the PDF Info dictionary).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a value by key, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// The document title entry, if any.
    pub fn title(&self) -> Option<&str> {
        self.get("Title")
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One entry of the outline embedded in the PDF, as reported by the backend.
///
/// Values are unvalidated: `level` may be below 1 and `page` may be missing
/// or point past the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeOutlineEntry {
    /// Nesting level (1 = top level)
    pub level: i32,

    /// Raw entry title
    pub title: String,

    /// Destination page index (0-based)
    pub page: Option<i64>,
}

impl NativeOutlineEntry {
    /// Create a new native outline entry.
    pub fn new(level: i32, title: impl Into<String>, page: Option<i64>) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}
