//! Outline resolution.
//!
//! Stages, in order:
//! 1. `native`: the outline embedded in the PDF, when it is substantial
//! 2. `markdown-headings`: `#` headings of the page markdown
//! 3. `bold-headings`: isolated `**bold**` lines that read like headings
//!
//! Stages never mix: the result comes entirely from the first accepted one.

use std::borrow::Cow;
use std::collections::HashSet;

use regex::Regex;

use crate::model::{NativeOutlineEntry, OutlineEntry, PageTextModel};
use crate::render::TextNormalizer;

use super::options::ResolveOptions;
use super::stage::{run_chain, Stage};

/// Deepest level assigned to a detected heading.
pub const MAX_HEADING_LEVEL: u32 = 6;

/// Bold lines scoring above this become headings.
const BOLD_HEADING_THRESHOLD: f32 = 0.4;

/// Score credited to a bold span that starts its line and stands alone.
const ISOLATED_LINE_BONUS: f32 = 0.3;

/// Words that commonly name document sections.
const SECTION_WORDS: &[&str] = &[
    "abstract",
    "acknowledgements",
    "appendix",
    "background",
    "chapter",
    "conclusion",
    "contents",
    "discussion",
    "introduction",
    "method",
    "overview",
    "part",
    "preface",
    "references",
    "results",
    "section",
    "step",
    "summary",
];

/// Resolves a document outline through an ordered fallback chain.
#[derive(Debug, Clone)]
pub struct OutlineResolver {
    options: ResolveOptions,
    normalizer: TextNormalizer,
    toc_number: Regex,
    heading_line: Regex,
    bold_line: Regex,
    title_words: Regex,
}

/// Input shared by the outline stages.
struct OutlineInput<'a> {
    resolver: &'a OutlineResolver,
    model: &'a PageTextModel,
}

impl OutlineResolver {
    /// Create a resolver with the given options.
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            options,
            normalizer: TextNormalizer::new(),
            toc_number: Regex::new(r"^\s*\d+(?:\.\d+)*\.?\s+").unwrap(),
            heading_line: Regex::new(r"^(#+)\s+(.*)$").unwrap(),
            bold_line: Regex::new(r"^\*\*([^*]+)\*\*$").unwrap(),
            title_words: Regex::new(r"^\p{Lu}\p{Ll}+(?: \p{Lu}\p{Ll}+){0,2}$").unwrap(),
        }
    }

    /// Resolve the outline. An empty outline is a valid result.
    pub fn resolve(&self, model: &PageTextModel) -> Vec<OutlineEntry> {
        self.resolve_with_stage(model)
            .map(|(_, outline)| outline)
            .unwrap_or_default()
    }

    /// Resolve the outline and report which stage produced it.
    pub fn resolve_with_stage(
        &self,
        model: &PageTextModel,
    ) -> Option<(&'static str, Vec<OutlineEntry>)> {
        let input = OutlineInput {
            resolver: self,
            model,
        };
        run_chain(&Self::stages(), &input)
    }

    fn stages<'a>() -> [Stage<OutlineInput<'a>, Vec<OutlineEntry>>; 3] {
        [
            Stage {
                name: "native",
                applies: |input| {
                    native_is_sufficient(
                        input.model.native_outline(),
                        input.model.page_count(),
                        &input.resolver.options,
                    )
                },
                extract: native_entries,
                accept: |_, entries| !entries.is_empty(),
            },
            Stage {
                name: "markdown-headings",
                applies: |_| true,
                extract: markdown_headings,
                accept: |_, entries| !entries.is_empty(),
            },
            Stage {
                name: "bold-headings",
                applies: |input| input.resolver.options.bold_heading_fallback,
                extract: bold_headings,
                accept: |_, entries| !entries.is_empty(),
            },
        ]
    }

    /// Score how much a cleaned line reads like a section heading.
    ///
    /// Short, title-cased or upper-cased text without punctuation and with
    /// common section words scores high; long sentences score low.
    pub fn heading_confidence(&self, text: &str) -> f32 {
        let text = text.trim();
        let char_count = text.chars().count();
        if char_count < 2 {
            return 0.0;
        }
        let word_count = text.split_whitespace().count();
        let mut score = 0.0;

        match word_count {
            0..=3 => score += 0.4,
            4..=6 => score += 0.2,
            n if n > 15 => score -= 0.3,
            _ => {}
        }

        if char_count <= 30 {
            score += 0.2;
        } else if char_count > 100 {
            score -= 0.4;
        }

        if self.title_words.is_match(text) {
            score += 0.3;
        }

        let lower = text.to_lowercase();
        if SECTION_WORDS.iter().any(|w| lower.contains(w)) {
            score += 0.2;
        }

        if is_upper_case(text) && word_count <= 5 {
            score += 0.2;
        } else if is_title_case(text) {
            score += 0.1;
        }

        let punctuation = text
            .chars()
            .filter(|c| ".,;:!?()[]{}".contains(*c))
            .count();
        if punctuation == 0 {
            score += 0.2;
        } else if punctuation as f32 > word_count as f32 / 2.0 {
            score -= 0.3;
        }

        score
    }
}

impl Default for OutlineResolver {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

/// Decide whether a native outline is substantial enough to use.
///
/// It is when it has more than `min_native_entries` entries, or when its
/// distinct destination pages cover more than `min_native_page_coverage`
/// of the document.
pub fn native_is_sufficient(
    entries: &[NativeOutlineEntry],
    page_count: usize,
    options: &ResolveOptions,
) -> bool {
    if entries.is_empty() {
        return false;
    }
    if entries.len() > options.min_native_entries {
        return true;
    }
    if page_count == 0 {
        return false;
    }

    let distinct_pages: HashSet<i64> = entries
        .iter()
        .filter_map(|e| e.page)
        .filter(|p| (0..page_count as i64).contains(p))
        .collect();
    distinct_pages.len() as f32 / page_count as f32 > options.min_native_page_coverage
}

fn native_entries(input: &OutlineInput<'_>) -> Vec<OutlineEntry> {
    let resolver = input.resolver;
    let last_page = input.model.page_count().saturating_sub(1) as i64;

    input
        .model
        .native_outline()
        .iter()
        .filter_map(|entry| {
            let raw = if resolver.options.strip_toc_numbering {
                resolver.toc_number.replace(&entry.title, "")
            } else {
                Cow::Borrowed(entry.title.as_str())
            };
            let text = resolver.normalizer.normalize(&raw);
            if text.is_empty() {
                return None;
            }

            let level = entry.level.max(1) as u32;
            let page = entry.page.unwrap_or(0).clamp(0, last_page) as u32;
            Some(OutlineEntry::new(level, text, page))
        })
        .collect()
}

fn markdown_headings(input: &OutlineInput<'_>) -> Vec<OutlineEntry> {
    let resolver = input.resolver;
    let mut entries: Vec<OutlineEntry> = Vec::new();

    for page in input.model.pages() {
        for line in page.markdown.lines() {
            let Some(caps) = resolver.heading_line.captures(line.trim()) else {
                continue;
            };

            let level = (caps[1].len() as u32).min(MAX_HEADING_LEVEL);
            let text = resolver.normalizer.normalize(&caps[2]);
            if text.is_empty() {
                continue;
            }

            let entry = OutlineEntry::new(level, text, page.index as u32);
            // Repeated running heads on one page
            if entries.last() == Some(&entry) {
                continue;
            }
            entries.push(entry);
        }
    }

    entries
}

fn bold_headings(input: &OutlineInput<'_>) -> Vec<OutlineEntry> {
    let resolver = input.resolver;
    let mut seen: HashSet<(usize, String)> = HashSet::new();
    let mut entries = Vec::new();

    for page in input.model.pages() {
        for line in page.markdown.lines() {
            let Some(caps) = resolver.bold_line.captures(line.trim()) else {
                continue;
            };

            let text = resolver.normalizer.normalize(&caps[1]);
            if text.is_empty() {
                continue;
            }

            let score = resolver.heading_confidence(&text) + ISOLATED_LINE_BONUS;
            if score <= BOLD_HEADING_THRESHOLD {
                continue;
            }
            let level = if score > 0.9 {
                1
            } else if score > 0.7 {
                2
            } else {
                3
            };

            if seen.insert((page.index, text.clone())) {
                entries.push(OutlineEntry::new(level, text, page.index as u32));
            }
        }
    }

    entries
}

fn is_upper_case(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

/// Every word starts with an upper-case letter followed by lower-case ones.
fn is_title_case(text: &str) -> bool {
    let mut any_word = false;
    for word in text.split_whitespace() {
        let mut letters = word.chars().filter(|c| c.is_alphabetic());
        match letters.next() {
            Some(first) if first.is_uppercase() => {
                if !letters.all(char::is_lowercase) {
                    return false;
                }
                any_word = true;
            }
            Some(_) => return false,
            None => {}
        }
    }
    any_word
}
