//! Text runs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A contiguous span of text sharing font attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Effective font size in points
    pub font_size: f32,

    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,

    /// Whether the font appears to be bold
    pub bold: bool,

    /// Whether the font appears to be italic
    pub italic: bool,

    /// Page index (0-based)
    pub page: usize,

    /// X position of the left edge
    pub x: f32,

    /// Y position of the baseline, measured from the top of the page
    pub y: f32,

    /// Width of the text (0 when unknown)
    pub width: f32,
}

impl TextRun {
    /// Create a run with the given text and font size at the page origin.
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: String::new(),
            bold: false,
            italic: false,
            page: 0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
        }
    }

    /// Set the font name, deriving bold/italic flags from it.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        let lower = self.font_name.to_lowercase();
        self.bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        self.italic = lower.contains("italic") || lower.contains("oblique");
        self
    }

    /// Place the run on a page.
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Set the position (y measured from the top of the page).
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the rendered width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Mark the run as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Mark the run as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Whether the run carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Reading order: top-to-bottom, then left-to-right.
    pub fn reading_order(a: &TextRun, b: &TextRun) -> Ordering {
        a.y.partial_cmp(&b.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    }
}
