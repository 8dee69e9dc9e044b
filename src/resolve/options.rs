//! Heuristic thresholds for title and outline resolution.

/// Titles that authoring tools write when the author left the field alone.
pub const DEFAULT_PLACEHOLDER_TITLES: &[&str] = &[
    "untitled",
    "untitled document",
    "document",
    "title",
    "no title",
    "unknown",
    "none",
];

/// Options controlling the title and outline fallback chains.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Runs within this many points of the largest size count as "largest" (default 0.5)
    pub size_tolerance: f32,

    /// Fewest words a first-line title may have (default 2)
    pub min_title_words: usize,

    /// Titles must have fewer words than this (default 20)
    pub max_title_words: usize,

    /// Metadata titles treated as missing, compared case-insensitively
    pub placeholder_titles: Vec<String>,

    /// Use the first outline heading when no title was found (default off)
    pub title_from_outline: bool,

    /// A native outline with more entries than this is used (default 2)
    pub min_native_entries: usize,

    /// ... as is one whose distinct pages cover more than this share of the document (default 0.5)
    pub min_native_page_coverage: f32,

    /// Remove leading section numbers like `1.2 ` from native entries (default off)
    pub strip_toc_numbering: bool,

    /// Fall back to isolated bold lines when no markdown heading exists (default on)
    pub bold_heading_fallback: bool,
}

impl ResolveOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest-text size tolerance in points.
    pub fn with_size_tolerance(mut self, tolerance: f32) -> Self {
        self.size_tolerance = tolerance.max(0.0);
        self
    }

    /// Set the minimum word count for a first-line title.
    pub fn with_min_title_words(mut self, words: usize) -> Self {
        self.min_title_words = words;
        self
    }

    /// Set the exclusive maximum word count for a title.
    pub fn with_max_title_words(mut self, words: usize) -> Self {
        self.max_title_words = words;
        self
    }

    /// Replace the placeholder title list.
    pub fn with_placeholder_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placeholder_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable taking the title from the outline.
    pub fn with_title_from_outline(mut self, enabled: bool) -> Self {
        self.title_from_outline = enabled;
        self
    }

    /// Set the native outline entry-count threshold.
    pub fn with_min_native_entries(mut self, entries: usize) -> Self {
        self.min_native_entries = entries;
        self
    }

    /// Set the native outline page-coverage threshold (0.0-1.0).
    pub fn with_min_native_page_coverage(mut self, coverage: f32) -> Self {
        self.min_native_page_coverage = coverage.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable stripping of section numbers from native entries.
    pub fn with_strip_toc_numbering(mut self, enabled: bool) -> Self {
        self.strip_toc_numbering = enabled;
        self
    }

    /// Enable or disable the bold-line heading fallback.
    pub fn with_bold_heading_fallback(mut self, enabled: bool) -> Self {
        self.bold_heading_fallback = enabled;
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            size_tolerance: 0.5,
            min_title_words: 2,
            max_title_words: 20,
            placeholder_titles: DEFAULT_PLACEHOLDER_TITLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            title_from_outline: false,
            min_native_entries: 2,
            min_native_page_coverage: 0.5,
            strip_toc_numbering: false,
            bold_heading_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResolveOptions::default();
        assert_eq!(options.size_tolerance, 0.5);
        assert_eq!(options.min_title_words, 2);
        assert_eq!(options.max_title_words, 20);
        assert_eq!(options.min_native_entries, 2);
        assert_eq!(options.min_native_page_coverage, 0.5);
        assert!(options.placeholder_titles.iter().any(|t| t == "untitled"));
        assert!(!options.title_from_outline);
        assert!(!options.strip_toc_numbering);
        assert!(options.bold_heading_fallback);
    }

    #[test]
    fn test_builder() {
        let options = ResolveOptions::new()
            .with_size_tolerance(-1.0)
            .with_min_native_page_coverage(2.0)
            .with_placeholder_titles(["draft"])
            .with_title_from_outline(true);

        assert_eq!(options.size_tolerance, 0.0);
        assert_eq!(options.min_native_page_coverage, 1.0);
        assert_eq!(options.placeholder_titles, vec!["draft".to_string()]);
        assert!(options.title_from_outline);
    }
}
