//! PDF parsing module.

mod backend;
mod catalog;
mod content;
mod layout;
mod options;
mod pdf_parser;

pub use backend::{decode_text_simple, LopdfBackend, PdfBackend};
pub use layout::{group_runs_into_lines, join_runs, FontStatistics, TextLine};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::{build_model, PdfParser};
