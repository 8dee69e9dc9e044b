//! # pdftoc
//!
//! Title and outline extraction for batches of PDF documents.
//!
//! Every document is reduced to a [`ResultRecord`]: a title and an ordered
//! list of headings with their level and 0-based page. Both are inferred
//! through layered heuristics, so documents without usable metadata or an
//! embedded table of contents still get a reasonable summary.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdftoc::{extract_file, run_batch};
//!
//! fn main() -> pdftoc::Result<()> {
//!     // One document
//!     let record = extract_file("report.pdf")?;
//!     println!("{}", record.title);
//!     for entry in &record.outline {
//!         println!("{} {} (page {})", "#".repeat(entry.level as usize), entry.text, entry.page);
//!     }
//!
//!     // A whole directory, one <name>.json per PDF
//!     let report = run_batch("input", "output")?;
//!     println!("{} written, {} failed", report.succeeded.len(), report.failures.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Parsing** ([`parser`]): lopdf content streams become positioned
//!   [`TextRun`]s and per-page markdown
//! - **Title** ([`TitleResolver`]): metadata, then the largest text on the
//!   first page, then the first meaningful line
//! - **Outline** ([`OutlineResolver`]): the embedded outline when it is
//!   substantial, then markdown headings, then bold emphasis lines
//! - **Cleanup** ([`normalize`]): every emitted string is normalized once
//! - **Batch** ([`batch`]): bounded parallel processing with a per-document
//!   timeout

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod resolve;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchReport, BatchRunner, DocumentFailure, FailureKind};
pub use detect::{is_pdf_bytes, sniff_header, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    Metadata, NativeOutlineEntry, OutlineEntry, PageText, PageTextModel, ResultRecord, TextRun,
};
pub use parser::{ErrorMode, LopdfBackend, ParseOptions, PdfBackend, PdfParser};
pub use render::{normalize, JsonFormat};
pub use resolve::{extract_record, Extraction, Extractor, OutlineResolver, ResolveOptions, TitleResolver};

use std::path::Path;

/// Extract the title and outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdftoc::extract_file;
///
/// let record = extract_file("report.pdf").unwrap();
/// println!("{}", serde_json::to_string_pretty(&record).unwrap());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ResultRecord> {
    Pdftoc::new().extract(path).map(|e| e.record)
}

/// Extract the title and outline of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdftoc::{extract_file_with_options, ParseOptions, ResolveOptions};
///
/// let record = extract_file_with_options(
///     "report.pdf",
///     ParseOptions::new().strict(),
///     ResolveOptions::default().with_title_from_outline(true),
/// )
/// .unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    parse_options: ParseOptions,
    resolve_options: ResolveOptions,
) -> Result<ResultRecord> {
    Pdftoc::new()
        .with_parse_options(parse_options)
        .with_resolve_options(resolve_options)
        .extract(path)
        .map(|e| e.record)
}

/// Extract the title and outline of an in-memory PDF.
///
/// `name` is the document identifier used for placeholder title detection
/// (normally the file stem).
pub fn extract_bytes(name: &str, data: &[u8]) -> Result<ResultRecord> {
    Pdftoc::new().extract_bytes(name, data).map(|e| e.record)
}

/// Process every PDF of `input_dir`, writing `<name>.json` files into
/// `output_dir`.
///
/// # Example
///
/// ```no_run
/// use pdftoc::run_batch;
///
/// let report = run_batch("pdfs", "records").unwrap();
/// for failure in &report.failures {
///     eprintln!("{}", failure);
/// }
/// ```
pub fn run_batch<P: AsRef<Path>, Q: AsRef<Path>>(input_dir: P, output_dir: Q) -> Result<BatchReport> {
    BatchRunner::default().run(input_dir.as_ref(), output_dir.as_ref())
}

/// Builder for single-document extraction.
///
/// # Example
///
/// ```no_run
/// use pdftoc::Pdftoc;
///
/// let extraction = Pdftoc::new()
///     .strict()
///     .title_from_outline()
///     .extract("report.pdf")?;
/// println!("title via {:?}", extraction.title_stage);
/// # Ok::<(), pdftoc::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdftoc {
    parse_options: ParseOptions,
    resolve_options: ResolveOptions,
}

impl Pdftoc {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first page that cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Treat undecodable pages as empty.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Fall back to the first top-level heading when no title is found.
    pub fn title_from_outline(mut self) -> Self {
        self.resolve_options = self.resolve_options.with_title_from_outline(true);
        self
    }

    /// Replace the parser options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Replace the resolver options.
    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve_options = options;
        self
    }

    /// Extract from a file; the file stem is the document name.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        let path = path.as_ref();
        let name = batch::InputDocument::from_path(path).name;
        let parser = PdfParser::open_with_options(path, self.parse_options.clone())?;
        self.extract_with(&parser, &name)
    }

    /// Extract from in-memory PDF data.
    pub fn extract_bytes(&self, name: &str, data: &[u8]) -> Result<Extraction> {
        let parser = PdfParser::from_bytes_with_options(data, self.parse_options.clone())?;
        self.extract_with(&parser, name)
    }

    fn extract_with(&self, parser: &PdfParser, name: &str) -> Result<Extraction> {
        let model = parser.parse(name)?;
        Ok(Extractor::new(self.resolve_options.clone()).extract(&model))
    }
}
