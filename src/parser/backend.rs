//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the document lookups the resolvers
//! need, isolating the concrete PDF library (lopdf) from the heuristics.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::sniff_header;
use crate::error::{Error, Result};
use crate::model::{Metadata, NativeOutlineEntry, TextRun};
use crate::render::MarkdownRenderer;

use super::catalog::{read_info, read_outline};
use super::content::extract_page_runs;
use super::layout::{group_runs_into_lines, FontStatistics};
use super::options::{ErrorMode, ParseOptions};

/// Abstract interface for PDF document access.
///
/// Pages are addressed by 0-based index.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Document information entries (e.g., `Title`, `Author`).
    fn metadata(&self) -> Result<Metadata>;

    /// Entries of the embedded outline in source order, possibly empty.
    fn native_outline(&self) -> Result<Vec<NativeOutlineEntry>>;

    /// Text runs of a page in content-stream order.
    fn page_runs(&self, page: usize) -> Result<Vec<TextRun>>;

    /// Markdown rendering of a page.
    fn page_markdown(&self, page: usize) -> Result<String>;
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
///
/// Text is extracted from every page when the backend is created, since
/// markdown rendering needs font statistics over the whole document.
pub struct LopdfBackend {
    doc: LopdfDocument,
    page_runs: Vec<Vec<TextRun>>,
    page_markdown: Vec<String>,
    font_stats: FontStatistics,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data, options)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8], options: &ParseOptions) -> Result<Self> {
        let header = sniff_header(data)?;
        log::debug!("Loading {} ({} bytes)", header, data.len());

        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc, options)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument, options: &ParseOptions) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let mut page_runs = Vec::with_capacity(page_ids.len());

        for (index, page_id) in page_ids.iter().enumerate() {
            match extract_page_runs(&doc, *page_id, index) {
                Ok(runs) => page_runs.push(runs),
                Err(e) => {
                    if options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to extract text from page {}: {}", index, e);
                    page_runs.push(Vec::new());
                }
            }
        }

        let font_stats = FontStatistics::from_runs(page_runs.iter().flatten());
        let renderer = MarkdownRenderer::new(options.max_heading_level);
        let page_markdown = page_runs
            .iter()
            .map(|runs| renderer.render_lines(&group_runs_into_lines(runs), &font_stats))
            .collect();

        Ok(Self {
            doc,
            page_runs,
            page_markdown,
            font_stats,
        })
    }

    /// Font statistics gathered over all pages.
    pub fn font_statistics(&self) -> &FontStatistics {
        &self.font_stats
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page < self.page_runs.len() {
            Ok(())
        } else {
            Err(Error::PageOutOfRange(page, self.page_runs.len()))
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> usize {
        self.page_runs.len()
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(read_info(&self.doc))
    }

    fn native_outline(&self) -> Result<Vec<NativeOutlineEntry>> {
        Ok(read_outline(&self.doc))
    }

    fn page_runs(&self, page: usize) -> Result<Vec<TextRun>> {
        self.check_page(page)?;
        Ok(self.page_runs[page].clone())
    }

    fn page_markdown(&self, page: usize) -> Result<String> {
        self.check_page(page)?;
        Ok(self.page_markdown[page].clone())
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM is the PDF standard for Unicode text strings
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Decode a string or name object into text.
pub(crate) fn text_from_object(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
}

/// Follow a reference to its target; other objects are returned as is.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
