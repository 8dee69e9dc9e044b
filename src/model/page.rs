//! Page-level types.

use super::TextRun;
use serde::{Deserialize, Serialize};

/// The text content of a single page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageText {
    /// Page index (0-based)
    pub index: usize,

    /// Text runs in source order
    pub runs: Vec<TextRun>,

    /// Markdown rendering of the page, used for heading detection
    pub markdown: String,
}

impl PageText {
    /// Create an empty page.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            runs: Vec::new(),
            markdown: String::new(),
        }
    }

    /// Set the page's text runs. Each run's page index is set to this page.
    pub fn with_runs(mut self, runs: Vec<TextRun>) -> Self {
        let index = self.index;
        self.runs = runs.into_iter().map(|r| r.on_page(index)).collect();
        self
    }

    /// Set the page's markdown rendering.
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = markdown.into();
        self
    }

    /// Largest font size among the non-blank runs.
    pub fn max_font_size(&self) -> Option<f32> {
        self.runs
            .iter()
            .filter(|r| !r.is_blank())
            .map(|r| r.font_size)
            .fold(None, |acc, size| match acc {
                Some(max) if max >= size => Some(max),
                _ => Some(size),
            })
    }

    /// Check if the page has no visible text at all.
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(TextRun::is_blank) && self.markdown.trim().is_empty()
    }
}
