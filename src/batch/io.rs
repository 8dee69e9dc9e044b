//! Input discovery and output writing.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{Error, Result};
use crate::model::ResultRecord;
use crate::render::{to_json, JsonFormat};

/// A PDF found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    /// Document identifier (file stem)
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
}

impl InputDocument {
    /// Create an input document from a path, using its file stem as name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { name, path }
    }
}

/// List the PDF files of a directory in file-name order.
///
/// Regular files with a `pdf` extension in any letter case are selected;
/// subdirectories are not searched. Files sharing a stem (`a.pdf`, `a.PDF`)
/// would share an output file, so only the first in name order is kept.
pub fn discover_inputs(dir: &Path) -> Result<Vec<InputDocument>> {
    let input_error = |source| Error::InputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(input_error)? {
        let path = entry.map_err(input_error)?.path();
        if path.is_file() && has_pdf_extension(&path) {
            inputs.push(InputDocument::from_path(path));
        }
    }

    inputs.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    let mut seen = HashSet::new();
    inputs.retain(|input| {
        let first = seen.insert(input.name.clone());
        if !first {
            warn!(
                "Skipping {}: another input already writes {}.json",
                input.path.display(),
                input.name
            );
        }
        first
    });
    Ok(inputs)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Create the output directory (and parents) if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Path of the record file for a document.
pub fn output_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

/// Write `<dir>/<name>.json`.
///
/// The record is written to a temporary file first and renamed into place,
/// so readers never see a partial record.
pub fn write_record(
    dir: &Path,
    name: &str,
    record: &ResultRecord,
    format: JsonFormat,
) -> Result<PathBuf> {
    let mut json = to_json(record, format)?;
    json.push('\n');

    let path = output_path(dir, name);
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".json.tmp")
        .tempfile_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(&path).map_err(|e| e.error)?;

    Ok(path)
}
