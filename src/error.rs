//! Error types for pdftoc.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pdftoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting titles and outlines.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file content is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Error serializing a result record.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A single document exceeded its processing time bound.
    #[error("Processing timed out after {0:?}")]
    Timeout(Duration),

    /// The worker processing a document died before producing a result.
    #[error("Worker failed: {0}")]
    Worker(String),

    /// The input directory could not be listed.
    #[error("Cannot read input directory {path}: {source}")]
    InputDir {
        /// Directory that was being listed
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The output directory could not be created.
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl Error {
    /// Whether this error is fatal to a whole batch run rather than to one document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InputDir { .. } | Error::OutputDir { .. })
    }
}
