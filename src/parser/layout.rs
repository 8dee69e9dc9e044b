//! Layout analysis for page text.
//!
//! Groups [`TextRun`]s into lines, joins them with sensible spacing and
//! gathers document-wide font statistics for heading detection.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::TextRun;

/// A text line composed of runs sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The runs in this line, sorted by X position
    pub runs: Vec<TextRun>,
    /// Y position of the baseline, measured from the top of the page
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from runs.
    pub fn from_runs(mut runs: Vec<TextRun>) -> Self {
        if runs.is_empty() {
            return Self {
                runs,
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        runs.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        // Dominant font size, weighted by text length
        let total_chars: usize = runs.iter().map(|r| r.text.chars().count()).sum();
        let weighted_size: f32 = runs
            .iter()
            .map(|r| r.font_size * r.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            runs[0].font_size
        };

        let y = runs[0].y;
        let x = runs[0].x;

        Self {
            runs,
            y,
            x,
            font_size,
        }
    }

    /// Get the combined text of all runs with appropriate spacing.
    pub fn text(&self) -> String {
        join_runs(self.runs.iter())
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .runs
            .iter()
            .filter(|r| r.bold)
            .map(|r| r.text.chars().count())
            .sum();
        let total_chars: usize = self.runs.iter().map(|r| r.text.chars().count()).sum();
        total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5
    }

    /// Check if the line appears to be uppercase.
    pub fn is_uppercase(&self) -> bool {
        let text = self.text();
        let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
        letters.peek().is_some() && letters.all(char::is_uppercase)
    }
}

/// Join runs of one line, inserting spaces based on their X gaps.
///
/// No space is inserted between adjacent characters of scripts that do not
/// use word spaces (Chinese, Japanese).
pub fn join_runs<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> String {
    let mut result = String::new();
    let mut prev: Option<&TextRun> = None;

    for run in runs {
        if let Some(prev_run) = prev {
            let prev_end = prev_run.x + prev_run.width;
            let gap = run.x - prev_end;

            let char_count = run.text.chars().count();
            let avg_char_width = if char_count > 0 && run.width > 0.0 {
                run.width / char_count as f32
            } else {
                run.font_size * 0.5
            };

            let should_insert_space = if gap > avg_char_width * 0.2 {
                let prev_is_cjk = prev_run
                    .text
                    .chars()
                    .last()
                    .map(is_spaceless_script_char)
                    .unwrap_or(false);
                let curr_is_cjk = run
                    .text
                    .chars()
                    .next()
                    .map(is_spaceless_script_char)
                    .unwrap_or(false);
                !(prev_is_cjk && curr_is_cjk)
            } else {
                false
            };

            let prev_ends_with_space = result.ends_with(' ') || result.ends_with('\u{00A0}');
            let curr_starts_with_space = run.text.starts_with(' ') || run.text.starts_with('\u{00A0}');

            if should_insert_space && !prev_ends_with_space && !curr_starts_with_space {
                result.push(' ');
            }
        }

        result.push_str(&run.text);
        prev = Some(run);
    }

    result
}

/// Group runs into lines, top to bottom.
///
/// Runs whose baselines lie within 30% of the font size of the current line
/// are placed on that line. Blank runs are dropped.
pub fn group_runs_into_lines<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> Vec<TextLine> {
    let mut runs: Vec<&TextRun> = runs.into_iter().filter(|r| !r.is_blank()).collect();
    if runs.is_empty() {
        return vec![];
    }

    runs.sort_by(|a, b| TextRun::reading_order(a, b));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_runs: Vec<TextRun> = Vec::new();
    let mut current_y: Option<f32> = None;

    for run in runs {
        let y_tolerance = run.font_size * 0.3;

        match current_y {
            Some(y) if (run.y - y).abs() <= y_tolerance => {
                current_line_runs.push(run.clone());
            }
            _ => {
                if !current_line_runs.is_empty() {
                    lines.push(TextLine::from_runs(std::mem::take(&mut current_line_runs)));
                }
                current_y = Some(run.y);
                current_line_runs.push(run.clone());
            }
        }
    }

    if !current_line_runs.is_empty() {
        lines.push(TextLine::from_runs(current_line_runs));
    }

    lines
}

/// Font statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Font sizes larger than body (potential headings), largest first
    pub heading_sizes: Vec<f32>,
    /// All observed font sizes (tenths of a point) with character counts
    pub size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Collect statistics from runs and analyze them.
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> Self {
        let mut stats = Self::default();
        for run in runs {
            if !run.is_blank() {
                stats.add_size(run.font_size, run.text.chars().count());
            }
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation covering `chars` characters.
    pub fn add_size(&mut self, size: f32, chars: usize) {
        let key = (size * 10.0).round() as i32;
        *self.size_histogram.entry(key).or_insert(0) += chars.max(1);
    }

    /// Calculate body size and heading sizes.
    pub fn analyze(&mut self) {
        // Ties go to the smaller size so the result does not depend on hash order
        let body_key = self
            .size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .map(|(key, _)| *key);

        let Some(body_key) = body_key else {
            self.body_size = 12.0;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = body_key as f32 / 10.0;

        let mut larger_sizes: Vec<f32> = self
            .size_histogram
            .keys()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size > self.body_size + 0.5)
            .collect();
        larger_sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        self.heading_sizes = larger_sizes;

        log::debug!(
            "Font statistics: body={:.1}pt, heading sizes={:?}",
            self.body_size,
            self.heading_sizes
        );
    }

    /// Get heading level for a font size (1-6, or 0 for body text).
    pub fn heading_level(&self, font_size: f32) -> u8 {
        // At least 1.5pt above body to avoid false positives
        if font_size < self.body_size + 1.5 {
            return 0;
        }

        for (i, &heading_size) in self.heading_sizes.iter().enumerate() {
            if font_size >= heading_size - 0.5 {
                return (i + 1).min(6) as u8;
            }
        }

        // Larger than body but smaller than every known heading size
        5
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
