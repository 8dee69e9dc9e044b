//! Title and outline inference.
//!
//! Both resolvers read a [`PageTextModel`] and never modify it or each
//! other's output. Every string they return has been normalized once.

mod options;
mod outline;
mod stage;
mod title;

pub use options::{ResolveOptions, DEFAULT_PLACEHOLDER_TITLES};
pub use outline::{native_is_sufficient, OutlineResolver, MAX_HEADING_LEVEL};
pub use stage::{run_chain, Stage};
pub use title::{word_count, TitleResolver};

use serde::Serialize;

use crate::model::{OutlineEntry, PageTextModel, ResultRecord};

/// Stage name reported when the title is taken from the outline.
pub const TITLE_FROM_OUTLINE_STAGE: &str = "outline";

/// A result record together with the stages that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// The extracted record
    pub record: ResultRecord,

    /// Winning title stage, if any
    pub title_stage: Option<&'static str>,

    /// Winning outline stage, if any
    pub outline_stage: Option<&'static str>,
}

/// Run both resolvers with shared options.
#[derive(Debug, Clone)]
pub struct Extractor {
    title: TitleResolver,
    outline: OutlineResolver,
    title_from_outline: bool,
}

impl Extractor {
    /// Create an extractor.
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            title_from_outline: options.title_from_outline,
            title: TitleResolver::new(options.clone()),
            outline: OutlineResolver::new(options),
        }
    }

    /// Extract the title and outline of a document.
    pub fn extract(&self, model: &PageTextModel) -> Extraction {
        let (title_stage, mut title) = match self.title.resolve_with_stage(model) {
            Some((stage, title)) => (Some(stage), title),
            None => (None, String::new()),
        };
        let (outline_stage, outline) = match self.outline.resolve_with_stage(model) {
            Some((stage, outline)) => (Some(stage), outline),
            None => (None, Vec::new()),
        };

        let mut title_stage = title_stage;
        if title.is_empty() && self.title_from_outline {
            if let Some(entry) = first_top_heading(&outline) {
                title = entry.text.clone();
                title_stage = Some(TITLE_FROM_OUTLINE_STAGE);
            }
        }

        log::debug!(
            "{}: title from {}, {} outline entries from {}",
            model.name(),
            title_stage.unwrap_or("nowhere"),
            outline.len(),
            outline_stage.unwrap_or("nowhere")
        );

        Extraction {
            record: ResultRecord::new(title, outline),
            title_stage,
            outline_stage,
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

/// The first level-1 entry, or the first entry of any level.
fn first_top_heading(outline: &[OutlineEntry]) -> Option<&OutlineEntry> {
    outline
        .iter()
        .find(|e| e.level == 1)
        .or_else(|| outline.first())
}

/// Extract the result record of a document.
pub fn extract_record(model: &PageTextModel, options: &ResolveOptions) -> ResultRecord {
    Extractor::new(options.clone()).extract(model).record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Metadata, PageText, TextRun};

    #[test]
    fn test_blank_document_gives_empty_record() {
        let model = PageTextModel::new("blank").with_pages(vec![PageText::new(0), PageText::new(1)]);
        let extraction = Extractor::default().extract(&model);

        assert_eq!(extraction.record, ResultRecord::default());
        assert_eq!(extraction.title_stage, None);
        assert_eq!(extraction.outline_stage, None);
    }

    #[test]
    fn test_title_and_outline_are_independent() {
        let model = PageTextModel::new("doc")
            .with_metadata(Metadata::new().with("Title", "From Metadata"))
            .with_page(
                PageText::new(0)
                    .with_runs(vec![TextRun::new("Heading", 20.0)])
                    .with_markdown("# Heading"),
            );

        let extraction = Extractor::default().extract(&model);
        assert_eq!(extraction.record.title, "From Metadata");
        assert_eq!(extraction.title_stage, Some("metadata"));
        assert_eq!(extraction.record.outline, vec![OutlineEntry::new(1, "Heading", 0)]);
        assert_eq!(extraction.outline_stage, Some("markdown-headings"));
    }

    #[test]
    fn test_title_from_outline() {
        let model = PageTextModel::new("doc")
            .with_page(PageText::new(0).with_markdown("## Minor\n\n# Major"));

        let plain = extract_record(&model, &ResolveOptions::default());
        assert_eq!(plain.title, "");

        let options = ResolveOptions::default().with_title_from_outline(true);
        let extraction = Extractor::new(options).extract(&model);
        assert_eq!(extraction.record.title, "Major");
        assert_eq!(extraction.title_stage, Some(TITLE_FROM_OUTLINE_STAGE));
    }
}
