//! Document model types.
//!
//! [`PageTextModel`] is the read-only view of one PDF that both resolvers
//! query. It is produced by a [`crate::parser::PdfBackend`] (or assembled
//! directly in tests) and never mutated after construction.
//! [`ResultRecord`] is the per-document output unit.

mod document;
mod page;
mod record;
mod run;

pub use document::{Metadata, NativeOutlineEntry, PageTextModel};
pub use page::PageText;
pub use record::{OutlineEntry, ResultRecord};
pub use run::TextRun;
