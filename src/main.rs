//! Censor - redact names, dates, phone numbers, places and concepts
//!
//! Reads every file matched by the input patterns, writes the censored
//! copy to the output directory and reports per-file statistics.

use anyhow::{bail, Context, Result};
use censor::{
    batch::{self, StatsSink},
    config::CensorConfig,
    detect::Detectors,
    pipeline::Redactor,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "censor")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Redact sensitive information from plain-text documents")]
struct Cli {
    /// Input file glob pattern(s)
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<String>,

    /// Output directory for censored files
    #[arg(long)]
    output: PathBuf,

    /// Statistics destination: stdout, stderr or a file path
    #[arg(long)]
    stats: Option<StatsSink>,

    /// Censor whole sentences about this concept (repeatable)
    #[arg(long = "concept")]
    concepts: Vec<String>,

    /// Censor names
    #[arg(long)]
    names: bool,

    /// Censor dates
    #[arg(long)]
    dates: bool,

    /// Censor phone numbers
    #[arg(long)]
    phones: bool,

    /// Censor addresses, organizations and countries
    #[arg(long)]
    address: bool,

    /// Configuration file path
    #[arg(short, long, env = "CENSOR_CONFIG")]
    config: Option<PathBuf>,

    /// Documents processed concurrently
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Configuration file (or defaults) with command-line switches applied
    fn censor_config(&self) -> Result<CensorConfig> {
        let mut config = match &self.config {
            Some(path) => CensorConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => CensorConfig::default(),
        };

        config.categories.names |= self.names;
        config.categories.dates |= self.dates;
        config.categories.phones |= self.phones;
        config.categories.address |= self.address;
        for concept in &self.concepts {
            if !config.concepts.contains(concept) {
                config.concepts.push(concept.clone());
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("censor={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.censor_config()?;
    if !config.any_enabled() {
        tracing::warn!("No categories or concepts enabled; documents are copied unchanged");
    }

    // Blocking HTTP clients must be built outside the async runtime
    let detectors = Detectors::from_config(&config.detectors)?;
    let redactor = Arc::new(Redactor::new(config, detectors)?);

    let inputs = batch::expand_inputs(&cli.input)?;
    if inputs.is_empty() {
        bail!("No input files matched {:?}", cli.input);
    }
    tracing::info!(
        files = inputs.len(),
        output = %cli.output.display(),
        "Censoring documents"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    let summary = runtime.block_on(batch::run_batch(
        Arc::clone(&redactor),
        inputs,
        cli.output.clone(),
        cli.stats.as_ref(),
        cli.jobs,
    ))?;
    drop(runtime);

    tracing::info!(
        censored = summary.succeeded(),
        failed = summary.failed.len(),
        redacted = summary.totals.entity_total(),
        "Done"
    );

    if summary.has_failures() {
        bail!("{} file(s) could not be censored", summary.failed.len());
    }
    Ok(())
}
