//! Parallel batch execution.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::thread;

use crossbeam_channel::{bounded, RecvTimeoutError};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::ResultRecord;

use super::io::{discover_inputs, ensure_output_dir, write_record, InputDocument};
use super::report::{BatchReport, DocumentFailure, DocumentOutcome, FailureKind};
use super::{process_document, BatchOptions};

/// Per-document extraction used by the runner.
pub(crate) type ExtractFn = fn(&Path, &BatchOptions) -> Result<ResultRecord>;

/// Processes every PDF of a directory and writes one record per document.
///
/// Documents are independent: a failure, panic or timeout in one of them
/// is recorded in the [`BatchReport`] and never stops the others.
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    options: BatchOptions,
}

impl BatchRunner {
    /// Create a runner.
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run the batch.
    ///
    /// Fails only when the input directory cannot be listed, the output
    /// directory cannot be created, or the worker pool cannot be built.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        self.run_with_progress(input_dir, output_dir, |_| {})
    }

    /// Run the batch, calling `on_outcome` as each document finishes.
    pub fn run_with_progress<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        on_outcome: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&DocumentOutcome) + Sync,
    {
        let inputs = discover_inputs(input_dir)?;
        self.run_inputs(&inputs, input_dir, output_dir, on_outcome)
    }

    /// Run the batch over an already discovered list of inputs.
    pub fn run_inputs<F>(
        &self,
        inputs: &[InputDocument],
        input_dir: &Path,
        output_dir: &Path,
        on_outcome: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&DocumentOutcome) + Sync,
    {
        self.run_inputs_with(inputs, input_dir, output_dir, process_document, on_outcome)
    }

    pub(crate) fn run_inputs_with<F>(
        &self,
        inputs: &[InputDocument],
        input_dir: &Path,
        output_dir: &Path,
        extract: ExtractFn,
        on_outcome: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&DocumentOutcome) + Sync,
    {
        ensure_output_dir(output_dir)?;

        let jobs = self.options.effective_jobs();
        info!(
            "Processing {} documents from {} with {} workers",
            inputs.len(),
            input_dir.display(),
            jobs
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("pdftoc-worker-{}", i))
            .build()
            .map_err(|e| Error::Worker(e.to_string()))?;

        let mut report = BatchReport::new(input_dir, output_dir);
        let outcomes: Vec<DocumentOutcome> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| {
                    let outcome = self.process_one(input, output_dir, extract);
                    on_outcome(&outcome);
                    outcome
                })
                .collect()
        });

        for outcome in outcomes {
            report.record(outcome);
        }
        report.finish();

        info!(
            "Finished: {} written, {} failed in {}ms",
            report.succeeded.len(),
            report.failures.len(),
            report.duration().num_milliseconds()
        );
        Ok(report)
    }

    fn process_one(
        &self,
        input: &InputDocument,
        output_dir: &Path,
        extract: ExtractFn,
    ) -> DocumentOutcome {
        let record = match self.extract_bounded(input, extract) {
            Ok(record) => record,
            Err(e) => {
                let failure = DocumentFailure::from_error(&input.name, &e);
                warn!("Skipping {}: {}", input.path.display(), e);
                return DocumentOutcome::Failed(failure);
            }
        };

        match write_record(output_dir, &input.name, &record, self.options.json_format) {
            Ok(output) => {
                debug!("Wrote {}", output.display());
                DocumentOutcome::Written {
                    document: input.name.clone(),
                    output,
                }
            }
            Err(e) => {
                warn!("Cannot write record for {}: {}", input.name, e);
                DocumentOutcome::Failed(DocumentFailure::new(
                    &input.name,
                    FailureKind::Write,
                    e.to_string(),
                ))
            }
        }
    }

    /// Extract one document on its own thread, bounded by the timeout.
    ///
    /// A thread that outlives its timeout is detached; its result is
    /// dropped when it eventually finishes.
    fn extract_bounded(&self, input: &InputDocument, extract: ExtractFn) -> Result<ResultRecord> {
        let (tx, rx) = bounded(1);
        let path = input.path.clone();
        let options = self.options.clone();

        thread::Builder::new()
            .name(format!("pdftoc-doc-{}", input.name))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| extract(&path, &options)))
                    .unwrap_or_else(|payload| Err(Error::Worker(panic_message(payload.as_ref()))));
                let _ = tx.send(result);
            })
            .map_err(|e| Error::Worker(e.to_string()))?;

        match rx.recv_timeout(self.options.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(self.options.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Worker("worker exited without a result".to_string()))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::model::OutlineEntry;

    /// Stand-in extraction keyed on the file stem.
    fn scripted_extract(path: &Path, _options: &BatchOptions) -> Result<ResultRecord> {
        let name = InputDocument::from_path(path).name;
        match name.as_str() {
            "slow" => {
                thread::sleep(Duration::from_secs(2));
                Ok(ResultRecord::new("Too Late", vec![]))
            }
            "boom" => panic!("malformed object stream"),
            _ => Ok(ResultRecord::new(
                format!("Title of {}", name),
                vec![OutlineEntry::new(1, "Introduction", 0)],
            )),
        }
    }

    fn inputs_named(dir: &Path, names: &[&str]) -> Vec<InputDocument> {
        names
            .iter()
            .map(|name| InputDocument::from_path(&dir.join(format!("{}.pdf", name))))
            .collect()
    }

    #[test]
    fn test_empty_input_dir() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let report = BatchRunner::default()
            .run(input.path(), output.path())
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("broken.pdf"), b"%PDF-1.7\nnot really").unwrap();
        fs::write(input.path().join("text.pdf"), b"hello").unwrap();

        let report = BatchRunner::new(BatchOptions::new().with_jobs(2))
            .run(input.path(), output.path())
            .unwrap();

        assert_eq!(report.total(), 2);
        assert!(report.succeeded.is_empty());
        assert!(report
            .failures
            .iter()
            .all(|f| f.kind == FailureKind::Unreadable));
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_input_dir() {
        let dir = TempDir::new().unwrap();
        let result = BatchRunner::default().run(&dir.path().join("nope"), dir.path());
        assert!(matches!(result, Err(Error::InputDir { .. })));
    }

    #[test]
    fn test_output_dir_is_a_file() {
        let input = TempDir::new().unwrap();
        let blocker = input.path().join("out");
        fs::write(&blocker, b"").unwrap();

        let result = BatchRunner::default().run(input.path(), &blocker.join("nested"));
        assert!(matches!(result, Err(Error::OutputDir { .. })));
    }

    #[test]
    fn test_slow_document_times_out() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let inputs = inputs_named(input.path(), &["alpha", "slow", "omega"]);

        let runner = BatchRunner::new(
            BatchOptions::new()
                .with_jobs(3)
                .with_timeout(Duration::from_millis(200)),
        );
        let report = runner
            .run_inputs_with(&inputs, input.path(), output.path(), scripted_extract, |_| {})
            .unwrap();

        assert_eq!(report.succeeded, ["alpha", "omega"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document, "slow");
        assert_eq!(report.failures[0].kind, FailureKind::Timeout);
        assert!(output.path().join("alpha.json").is_file());
        assert!(output.path().join("omega.json").is_file());
        assert!(!output.path().join("slow.json").exists());
    }

    #[test]
    fn test_panicking_document_is_isolated() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let inputs = inputs_named(input.path(), &["alpha", "boom", "omega"]);

        let report = BatchRunner::new(BatchOptions::new().with_jobs(2))
            .run_inputs_with(&inputs, input.path(), output.path(), scripted_extract, |_| {})
            .unwrap();

        assert_eq!(report.succeeded, ["alpha", "omega"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document, "boom");
        assert_eq!(report.failures[0].kind, FailureKind::Worker);
        assert!(report.failures[0].message.contains("malformed object stream"));

        let record: ResultRecord =
            serde_json::from_str(&fs::read_to_string(output.path().join("omega.json")).unwrap())
                .unwrap();
        assert_eq!(record.title, "Title of omega");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "panicked: boom");
    }
}
