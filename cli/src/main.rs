//! pdftoc CLI - title and outline extraction for PDF batches

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdftoc::batch::{discover_inputs, DocumentOutcome};
use pdftoc::{BatchOptions, BatchRunner, JsonFormat, ParseOptions, Pdftoc, ResolveOptions};

#[derive(Parser)]
#[command(name = "pdftoc")]
#[command(version)]
#[command(about = "Extract titles and outlines from PDF files as JSON", long_about = None)]
struct Cli {
    /// Directory containing the PDF files
    #[arg(short, long, value_name = "DIR", env = "PDFTOC_INPUT_DIR", default_value = "input")]
    input: PathBuf,

    /// Directory receiving one <name>.json per PDF
    #[arg(short, long, value_name = "DIR", env = "PDFTOC_OUTPUT_DIR", default_value = "output")]
    output: PathBuf,

    /// Number of parallel workers (0 = all cores)
    #[arg(short, long, env = "PDFTOC_JOBS", default_value = "0")]
    jobs: usize,

    /// Per-document time limit in seconds
    #[arg(long, value_name = "SECS", env = "PDFTOC_TIMEOUT", default_value = "120")]
    timeout: u64,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Exit with status 2 when any document failed
    #[arg(long)]
    strict: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    tuning: Tuning,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Heuristic tuning shared by the batch run and `inspect`.
#[derive(Args, Clone)]
struct Tuning {
    /// Fail a document on the first undecodable page
    #[arg(long, global = true)]
    strict_pages: bool,

    /// Use the first top-level heading when no title is found
    #[arg(long, global = true)]
    title_from_outline: bool,

    /// Strip leading section numbers from embedded outline entries
    #[arg(long, global = true)]
    strip_toc_numbering: bool,

    /// Do not treat isolated bold lines as headings
    #[arg(long, global = true)]
    no_bold_headings: bool,

    /// Embedded outlines need more entries than this to be used
    #[arg(long, value_name = "N", global = true)]
    min_native_entries: Option<usize>,

    /// Maximum title length in words (exclusive)
    #[arg(long, value_name = "N", global = true)]
    max_title_words: Option<usize>,
}

impl Tuning {
    fn parse_options(&self) -> ParseOptions {
        if self.strict_pages {
            ParseOptions::new().strict()
        } else {
            ParseOptions::new().lenient()
        }
    }

    fn resolve_options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::default()
            .with_title_from_outline(self.title_from_outline)
            .with_strip_toc_numbering(self.strip_toc_numbering)
            .with_bold_heading_fallback(!self.no_bold_headings);
        if let Some(n) = self.min_native_entries {
            options = options.with_min_native_entries(n);
        }
        if let Some(n) = self.max_title_words {
            options = options.with_max_title_words(n);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a single PDF and print its record with the winning stages
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Inspect { input, compact }) => cmd_inspect(input, *compact, &cli.tuning),
        Some(Commands::Version) => {
            cmd_version();
            Ok(ExitCode::SUCCESS)
        }
        None => cmd_batch(&cli),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

fn cmd_batch(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let options = BatchOptions::new()
        .with_jobs(cli.jobs)
        .with_timeout(Duration::from_secs(cli.timeout.max(1)))
        .with_json_format(format)
        .with_parse_options(cli.tuning.parse_options())
        .with_resolve_options(cli.tuning.resolve_options());

    let inputs = discover_inputs(&cli.input)?;
    if inputs.is_empty() {
        println!(
            "{} no PDF files in {}",
            "Info:".blue().bold(),
            cli.input.display()
        );
    }

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(inputs.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let runner = BatchRunner::new(options);
    let report = runner.run_inputs(&inputs, &cli.input, &cli.output, |outcome| {
        if let DocumentOutcome::Failed(failure) = outcome {
            pb.println(format!("{} {}", "Failed".red(), failure));
        }
        pb.set_message(outcome.document().to_string());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if let Some(path) = &cli.report {
        fs::write(path, report.to_json()?)?;
    }

    print_summary(&report, &cli.output);

    if cli.strict && !report.is_success() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &pdftoc::BatchReport, output: &Path) {
    println!(
        "{} {} of {} documents in {:.2}s",
        "Done!".green().bold(),
        report.succeeded.len(),
        report.total(),
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!("  {} {}", "Output:".bold(), output.display());

    if !report.failures.is_empty() {
        println!("\n{}", "Failures:".yellow().bold());
        for (i, failure) in report.failures.iter().enumerate() {
            let branch = if i + 1 == report.failures.len() {
                "└─"
            } else {
                "├─"
            };
            println!("  {} {}", branch.dimmed(), failure);
        }
    }
}

fn cmd_inspect(
    input: &Path,
    compact: bool,
    tuning: &Tuning,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let extraction = Pdftoc::new()
        .with_parse_options(tuning.parse_options())
        .with_resolve_options(tuning.resolve_options())
        .extract(input)?;

    println!("{}", "Extraction".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {}",
        "Title stage".bold(),
        extraction.title_stage.unwrap_or("none")
    );
    println!(
        "{}: {}",
        "Outline stage".bold(),
        extraction.outline_stage.unwrap_or("none")
    );
    println!("{}", "─".repeat(40).dimmed());

    let json = if compact {
        serde_json::to_string(&extraction.record)?
    } else {
        serde_json::to_string_pretty(&extraction.record)?
    };
    println!("{}", json);

    Ok(ExitCode::SUCCESS)
}

fn cmd_version() {
    println!("{} {}", "pdftoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and outline extraction tool");
    println!();
    println!("License: MIT");
}
