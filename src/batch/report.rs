//! Per-run diagnostics.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Why a document produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Not a PDF, corrupt, or encrypted
    Unreadable,
    /// Processing exceeded the per-document time bound
    Timeout,
    /// The record could not be written
    Write,
    /// The worker panicked or could not be started
    Worker,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Unreadable => "unreadable",
            FailureKind::Timeout => "timeout",
            FailureKind::Write => "write",
            FailureKind::Worker => "worker",
        };
        write!(f, "{}", s)
    }
}

/// A document that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Document identifier
    pub document: String,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable cause
    pub message: String,
}

impl DocumentFailure {
    /// Create a failure entry.
    pub fn new(document: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            kind,
            message: message.into(),
        }
    }

    /// Classify a processing error of a document.
    pub fn from_error(document: impl Into<String>, err: &Error) -> Self {
        let kind = match err {
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Worker(_) => FailureKind::Worker,
            _ => FailureKind::Unreadable,
        };
        Self::new(document, kind, err.to_string())
    }
}

impl std::fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.document, self.kind, self.message)
    }
}

/// The result of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// A record was written
    Written {
        /// Document identifier
        document: String,
        /// Path of the record file
        output: PathBuf,
    },
    /// No record was written
    Failed(DocumentFailure),
}

impl DocumentOutcome {
    /// Document identifier.
    pub fn document(&self) -> &str {
        match self {
            DocumentOutcome::Written { document, .. } => document,
            DocumentOutcome::Failed(failure) => &failure.document,
        }
    }

    /// Whether a record was written.
    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Written { .. })
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Directory the inputs were read from
    pub input_dir: PathBuf,
    /// Directory the records were written to
    pub output_dir: PathBuf,
    /// Documents with a written record, in input order
    pub succeeded: Vec<String>,
    /// Documents without a record, in input order
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Start an empty report.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a document outcome.
    pub fn record(&mut self, outcome: DocumentOutcome) {
        match outcome {
            DocumentOutcome::Written { document, .. } => self.succeeded.push(document),
            DocumentOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    /// Mark the run as finished now.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Number of documents processed.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// Whether every document produced a record.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_failure_classification() {
        let timeout = DocumentFailure::from_error("slow", &Error::Timeout(Duration::from_secs(5)));
        assert_eq!(timeout.kind, FailureKind::Timeout);

        let corrupt = DocumentFailure::from_error("bad", &Error::UnknownFormat);
        assert_eq!(corrupt.kind, FailureKind::Unreadable);
        assert_eq!(corrupt.to_string(), "bad (unreadable): Unknown file format: not a valid PDF");
    }

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::new("in", "out");
        report.record(DocumentOutcome::Written {
            document: "a".to_string(),
            output: PathBuf::from("out/a.json"),
        });
        report.record(DocumentOutcome::Failed(DocumentFailure::new(
            "b",
            FailureKind::Worker,
            "panicked",
        )));
        report.finish();

        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded, vec!["a".to_string()]);
        assert!(!report.is_success());
        assert!(report.duration() >= chrono::Duration::zero());
    }

    #[test]
    fn test_report_json() {
        let mut report = BatchReport::new("in", "out");
        report.record(DocumentOutcome::Failed(DocumentFailure::new(
            "b",
            FailureKind::Timeout,
            "too slow",
        )));

        let json = report.to_json().unwrap();
        assert!(json.contains("\"kind\": \"timeout\""));
        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
