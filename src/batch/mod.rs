//! Batch processing of a directory of PDFs.
//!
//! Each `<name>.pdf` in the input directory yields `<name>.json` in the
//! output directory, containing the document's [`ResultRecord`].

mod io;
mod report;
mod runner;

pub use io::{discover_inputs, ensure_output_dir, output_path, write_record, InputDocument};
pub use report::{BatchReport, DocumentFailure, DocumentOutcome, FailureKind};
pub use runner::BatchRunner;

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::model::ResultRecord;
use crate::parser::{ParseOptions, PdfParser};
use crate::render::JsonFormat;
use crate::resolve::{Extractor, ResolveOptions};

/// Default time bound for a single document.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of workers (0 = available parallelism)
    pub jobs: usize,

    /// Time bound for a single document
    pub timeout: Duration,

    /// Output JSON layout
    pub json_format: JsonFormat,

    /// Options passed to the PDF parser
    pub parse: ParseOptions,

    /// Options passed to the title and outline resolvers
    pub resolve: ResolveOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            timeout: DEFAULT_TIMEOUT,
            json_format: JsonFormat::Pretty,
            parse: ParseOptions::default(),
            resolve: ResolveOptions::default(),
        }
    }
}

impl BatchOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers (0 = available parallelism).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the per-document time bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the output JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set the parser options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set the resolver options.
    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve = options;
        self
    }

    /// Worker count actually used.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Parse one PDF and extract its record.
pub fn process_document(path: &Path, options: &BatchOptions) -> Result<ResultRecord> {
    let name = InputDocument::from_path(path).name;
    let parser = PdfParser::open_with_options(path, options.parse.clone())?;
    let model = parser.parse(&name)?;
    Ok(Extractor::new(options.resolve.clone()).extract(&model).record)
}
