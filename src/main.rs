use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use hostprobe::config::{self, OutputFormat, load_config, load_config_from_path};
use hostprobe::logging;
use hostprobe::report::sink::{JsonSink, ReportSink, TextSink};
use hostprobe::report::{MetricFamily, Providers, Reporter};
use hostprobe::runtime::TrackingAllocator;
use tracing::{info, warn};

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator;

#[derive(Parser)]
#[command(
    name = "hostprobe",
    about = "One-shot report of processor, memory, OS, runtime, task and filesystem state"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wait between the two processor samples, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Budget for the two processor tick reads, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Metric family to report; repeat for several. Defaults to all.
    #[arg(long = "family", value_enum)]
    families: Vec<MetricFamily>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init_tracing(
        logging::parse_level(&config.logging.level),
        config.logging.json,
    )?;

    let reporter = Reporter::new(Providers::system(), config.sampling.policy())
        .with_families(&config.report.families);
    info!(families = ?reporter.families(), "collecting report");
    let report = reporter.run_blocking(ctrl_c)?;

    let stdout = std::io::stdout().lock();
    match config.report.format {
        OutputFormat::Text => TextSink::new(stdout, config.report.max_name_width).emit(&report)?,
        OutputFormat::Json => JsonSink::new(stdout).emit(&report)?,
    }

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval_ms {
        config.sampling.interval_ms = interval;
    }
    if let Some(timeout) = cli.timeout_ms {
        config.sampling.timeout_ms = timeout;
    }
    if let Some(format) = cli.format {
        config.report.format = format;
    }
    if !cli.families.is_empty() {
        config.report.families = cli.families.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    config
}

/// Resolves on Ctrl-C. Without a signal handler it never resolves and the
/// report runs to completion.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
