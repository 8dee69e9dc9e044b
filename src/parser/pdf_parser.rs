//! Building a [`PageTextModel`] from a PDF.

use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::model::{PageText, PageTextModel};

use super::backend::{LopdfBackend, PdfBackend};
use super::options::ParseOptions;

/// PDF document parser.
pub struct PdfParser {
    backend: LopdfBackend,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_file(path, &options)?;
        Ok(Self { backend })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data, &options)?;
        Ok(Self { backend })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Build the page-text model of the document identified by `name`.
    pub fn parse(&self, name: &str) -> Result<PageTextModel> {
        build_model(name, &self.backend)
    }

    /// The backend this parser reads from.
    pub fn backend(&self) -> &LopdfBackend {
        &self.backend
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

/// Assemble a [`PageTextModel`] from any backend.
///
/// Page failures propagate. Metadata and outline failures only cost those
/// inputs: they are logged and treated as absent.
pub fn build_model(name: &str, backend: &dyn PdfBackend) -> Result<PageTextModel> {
    let metadata = backend.metadata().unwrap_or_else(|e| {
        log::warn!("{}: metadata unavailable: {}", name, e);
        Default::default()
    });
    let native_outline = backend.native_outline().unwrap_or_else(|e| {
        log::warn!("{}: native outline unavailable: {}", name, e);
        Vec::new()
    });

    let mut model = PageTextModel::new(name)
        .with_metadata(metadata)
        .with_native_outline(native_outline);

    for index in 0..backend.page_count() {
        let page = PageText::new(index)
            .with_runs(backend.page_runs(index)?)
            .with_markdown(backend.page_markdown(index)?);
        model = model.with_page(page);
    }

    log::debug!(
        "{}: {} pages, {} metadata entries, {} native outline entries",
        name,
        model.page_count(),
        model.metadata().len(),
        model.native_outline().len()
    );

    Ok(model)
}
