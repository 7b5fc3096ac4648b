//! Batch runner
//!
//! Expands input globs, redacts each matched document on the blocking pool
//! (bounded by a semaphore), writes `<output>/<basename>.censored`, and
//! emits one statistics block per document in input order.

use crate::error::{Error, Result};
use crate::pipeline::{Pass, Redactor, Statistics};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Extension appended to censored output files
pub const OUTPUT_EXTENSION: &str = "censored";

/// Where statistics reports go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsSink {
    Stdout,
    Stderr,
    /// Truncated once per run, then appended per document
    File(PathBuf),
}

impl FromStr for StatsSink {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

impl fmt::Display for StatsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl StatsSink {
    fn open(&self) -> Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match self {
            Self::Stdout => Box::new(std::io::stdout()),
            Self::Stderr => Box::new(std::io::stderr()),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Box::new(File::create(path)?)
            }
        };
        Ok(writer)
    }
}

/// Expand input glob patterns into regular files.
///
/// Matches keep pattern order, then the glob's own (alphabetical) order.
/// Files matched by more than one pattern are kept once. A pattern that
/// matches nothing is logged and ignored.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let mut matched = 0usize;
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) if path.is_file() => {
                    matched += 1;
                    if !files.contains(&path) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(pattern = %pattern, error = %e, "Unreadable glob match"),
            }
        }
        if matched == 0 {
            tracing::warn!(pattern = %pattern, "Input pattern matched no files");
        }
    }
    Ok(files)
}

/// Output location for `input` inside `output_dir`
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    output_dir.join(format!("{}.{}", name, OUTPUT_EXTENSION))
}

/// Result of censoring one file
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub statistics: Statistics,
    pub skipped: Vec<Pass>,
}

/// Read, redact and write one document
pub fn censor_file(redactor: &Redactor, input: &Path, output_dir: &Path) -> Result<DocumentReport> {
    let text = std::fs::read_to_string(input)?;
    let result = redactor.redact(&text);

    std::fs::create_dir_all(output_dir)?;
    let output = output_path(output_dir, input);
    std::fs::write(&output, &result.text)?;

    Ok(DocumentReport {
        input: input.to_path_buf(),
        output,
        statistics: result.statistics,
        skipped: result.skipped,
    })
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Censored documents, in input order
    pub reports: Vec<DocumentReport>,
    /// Documents that could not be censored, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Counts summed over all censored documents
    pub totals: Statistics,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Censor `inputs` concurrently, at most `jobs` at a time.
///
/// Statistics blocks are written to `sink` after all documents finish, in
/// input order. A document that fails is logged and recorded in
/// [`BatchSummary::failed`]; the rest of the batch continues.
pub async fn run_batch(
    redactor: Arc<Redactor>,
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    sink: Option<&StatsSink>,
    jobs: usize,
) -> Result<BatchSummary> {
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, input) in inputs.iter().cloned().enumerate() {
        let redactor = Arc::clone(&redactor);
        let output_dir = output_dir.clone();
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => tokio::task::spawn_blocking(move || {
                    censor_file(&redactor, &input, &output_dir)
                })
                .await
                .map_err(|e| Error::Batch(e.to_string()))
                .and_then(|r| r),
                Err(e) => Err(Error::Batch(e.to_string())),
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<Result<DocumentReport>>> = inputs.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => tracing::error!(error = %e, "Document task aborted"),
        }
    }

    let mut summary = BatchSummary::default();
    for (input, outcome) in inputs.into_iter().zip(outcomes) {
        match outcome {
            Some(Ok(report)) => {
                tracing::info!(
                    input = %report.input.display(),
                    output = %report.output.display(),
                    redacted = report.statistics.entity_total(),
                    "Censored document"
                );
                if !report.skipped.is_empty() {
                    let skipped: Vec<String> = report.skipped.iter().map(|p| p.to_string()).collect();
                    tracing::warn!(input = %report.input.display(), skipped = ?skipped, "Document censored with passes skipped");
                }
                summary.totals.merge(&report.statistics);
                summary.reports.push(report);
            }
            Some(Err(e)) => {
                tracing::error!(input = %input.display(), error = %e, "Failed to censor document");
                summary.failed.push((input, e.to_string()));
            }
            None => summary.failed.push((input, "task aborted".to_string())),
        }
    }

    if let Some(sink) = sink {
        let mut writer = sink.open()?;
        for report in &summary.reports {
            let source = report.input.display().to_string();
            writer.write_all(report.statistics.render_report(&source).as_bytes())?;
        }
        writer.flush()?;
    }

    Ok(summary)
}
