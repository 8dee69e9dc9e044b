//! Title resolution.
//!
//! Stages, in order:
//! 1. `metadata`: the document's `Title` entry, unless it is a placeholder
//! 2. `largest-text`: the text set in the largest size on the first page
//! 3. `first-line`: the first plausible line of the first page

use regex::RegexSet;

use crate::model::PageTextModel;
use crate::parser::{group_runs_into_lines, TextLine};
use crate::render::TextNormalizer;

use super::options::ResolveOptions;
use super::stage::{run_chain, Stage};

/// Title suffixes left behind by authoring tools ("report.docx").
const AUTHORING_EXTENSIONS: &[&str] = &[
    ".doc", ".docx", ".pdf", ".indd", ".ppt", ".pptx", ".xls", ".xlsx", ".odt", ".rtf", ".txt",
    ".tex", ".dvi", ".qxd",
];

/// Page numbers, running headers and footers.
const BOILERPLATE_PATTERNS: &[&str] = &[
    r"^\d+$",
    r"^-\s*\d+\s*-$",
    r"(?i)^page\s*\d+(\s*(of|/)\s*\d+)?$",
    r"^\d+\s*(?i:of|/)\s*\d+$",
    r"(?i)^(copyright|©|\(c\))",
    r"(?i)\ball rights reserved\b",
    r"(?i)\b(confidential|proprietary)\b",
    r"(?i)^draft\b",
    r"(?i)^version\s*\d",
    r"(?i)(^|\s)(www\.|https?:)",
];

/// Resolves a document title through an ordered fallback chain.
#[derive(Debug, Clone)]
pub struct TitleResolver {
    options: ResolveOptions,
    normalizer: TextNormalizer,
    boilerplate: RegexSet,
}

/// Input shared by the title stages.
struct TitleInput<'a> {
    resolver: &'a TitleResolver,
    model: &'a PageTextModel,
}

impl TitleResolver {
    /// Create a resolver with the given options.
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            options,
            normalizer: TextNormalizer::new(),
            boilerplate: RegexSet::new(BOILERPLATE_PATTERNS).unwrap(),
        }
    }

    /// Resolve the title, or the empty string when every stage fails.
    pub fn resolve(&self, model: &PageTextModel) -> String {
        self.resolve_with_stage(model)
            .map(|(_, title)| title)
            .unwrap_or_default()
    }

    /// Resolve the title and report which stage produced it.
    pub fn resolve_with_stage(&self, model: &PageTextModel) -> Option<(&'static str, String)> {
        let input = TitleInput {
            resolver: self,
            model,
        };
        run_chain(&Self::stages(), &input)
    }

    fn stages<'a>() -> [Stage<TitleInput<'a>, String>; 3] {
        [
            Stage {
                name: "metadata",
                applies: |input| input.model.metadata().title().is_some(),
                extract: metadata_title,
                accept: |input, title| {
                    !title.is_empty() && !input.resolver.is_placeholder(title, input.model.name())
                },
            },
            Stage {
                name: "largest-text",
                applies: has_first_page_text,
                extract: largest_text,
                accept: |input, title| {
                    title.chars().filter(|c| c.is_alphanumeric()).count() >= 2
                        && word_count(title) < input.resolver.options.max_title_words
                },
            },
            Stage {
                name: "first-line",
                applies: has_first_page_text,
                extract: first_meaningful_line,
                accept: |_, title| !title.is_empty(),
            },
        ]
    }

    /// Check whether a (normalized) metadata title carries no information.
    pub fn is_placeholder(&self, title: &str, document_name: &str) -> bool {
        let lower = title.trim().to_lowercase();
        if lower.is_empty() {
            return true;
        }

        let name = document_name.trim().to_lowercase();
        if lower == name || lower == self.normalizer.normalize(&name) {
            return true;
        }

        if self
            .options
            .placeholder_titles
            .iter()
            .any(|p| p.trim().to_lowercase() == lower)
        {
            return true;
        }

        AUTHORING_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }

    /// Check whether a (normalized) line is a page number, header or footer.
    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.is_match(line.trim())
    }
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn has_first_page_text(input: &TitleInput<'_>) -> bool {
    input.model.page(0).is_some_and(|page| !page.is_blank())
}

fn metadata_title(input: &TitleInput<'_>) -> String {
    input
        .model
        .metadata()
        .title()
        .map(|title| input.resolver.normalizer.normalize(title))
        .unwrap_or_default()
}

fn largest_text(input: &TitleInput<'_>) -> String {
    let Some(page) = input.model.page(0) else {
        return String::new();
    };
    let Some(max_size) = page.max_font_size() else {
        return String::new();
    };

    let threshold = max_size - input.resolver.options.size_tolerance;
    let lines = group_runs_into_lines(page.runs.iter().filter(|r| r.font_size >= threshold));
    let joined = lines
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join(" ");

    input.resolver.normalizer.normalize(&joined)
}

fn first_meaningful_line(input: &TitleInput<'_>) -> String {
    let Some(page) = input.model.page(0) else {
        return String::new();
    };
    let resolver = input.resolver;
    let options = &resolver.options;

    group_runs_into_lines(&page.runs)
        .iter()
        .map(|line| resolver.normalizer.normalize(&line.text()))
        .find(|text| {
            let words = word_count(text);
            words >= options.min_title_words
                && words < options.max_title_words
                && !resolver.is_boilerplate(text)
        })
        .unwrap_or_default()
}
