//! Text normalization for extracted titles and headings.
//!
//! Every string that ends up in a [`crate::ResultRecord`] passes through
//! [`TextNormalizer::normalize`] exactly once. The operation is total and
//! idempotent: `normalize(normalize(x)) == normalize(x)`.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleans raw text fragments coming from PDF text runs, outline entries or
/// markdown renderings.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    leading_heading_marks: Regex,
    trailing_heading_marks: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self {
            leading_heading_marks: Regex::new(r"^\s*(?:#+\s*)+").unwrap(),
            trailing_heading_marks: Regex::new(r"(?:\s+#+)+\s*$").unwrap(),
        }
    }

    /// Normalize a raw text fragment.
    ///
    /// Returns the empty string when nothing alphanumeric survives cleaning.
    pub fn normalize(&self, raw: &str) -> String {
        // Stage 1: drop invisible characters, blank out control characters
        let visible: String = raw
            .chars()
            .filter(|c| !is_invisible(*c))
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        // Stage 2: compatibility normalization (ligatures, full-width forms, NBSP)
        let folded: String = visible.nfkc().map(fold_punctuation).collect();

        // Stage 3: markdown emphasis and heading markers
        let unmarked: String = folded
            .chars()
            .filter(|c| !matches!(c, '*' | '_' | '`'))
            .collect();
        let unmarked = self.leading_heading_marks.replace(&unmarked, "");
        let unmarked = self.trailing_heading_marks.replace(&unmarked, "");

        // Stage 4: whitespace
        let collapsed = unmarked.split_whitespace().collect::<Vec<_>>().join(" ");

        // Marks separated by removed characters compose now
        let result: String = collapsed.nfkc().collect();

        if result.chars().any(char::is_alphanumeric) {
            result
        } else {
            String::new()
        }
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize text with a shared default [`TextNormalizer`].
pub fn normalize(raw: &str) -> String {
    static NORMALIZER: OnceLock<TextNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(TextNormalizer::new).normalize(raw)
}

/// Characters that carry no visible content.
fn is_invisible(c: char) -> bool {
    let code = c as u32;
    matches!(
        c,
        '\u{00AD}' // soft hyphen
            | '\u{200B}'..='\u{200F}' // zero-width space/joiners, LRM/RLM
            | '\u{202A}'..='\u{202E}' // bidi embeddings and overrides
            | '\u{2060}'..='\u{2064}' // word joiner, invisible operators
            | '\u{2066}'..='\u{2069}' // bidi isolates
            | '\u{FEFF}' // BOM
            | '\u{FFFD}' // replacement character
    ) || (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Fold typographic dashes and quotes to ASCII.
fn fold_punctuation(c: char) -> char {
    match c {
        '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        other => other,
    }
}
