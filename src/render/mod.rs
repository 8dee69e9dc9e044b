//! Text cleanup and output rendering.

mod cleanup;
mod json;
mod markdown;

pub use cleanup::{normalize, TextNormalizer};
pub use json::{to_json, JsonFormat};
pub use markdown::MarkdownRenderer;
