mod logging;

use std::path::PathBuf;
use std::process;

use backup_report_pipeline::{
    OutputFormat, PipelineError, ReportConfig, build_rows_parallel, host_records, load_input,
    write_report,
};
use clap::Parser;
use tracing::info;

use crate::logging::LogConfig;

#[derive(Debug, Parser)]
#[command(name = "backup-report", version)]
#[command(about = "Flatten vCenter backup schedules and job history into a report")]
struct Cli {
    /// Path to a JSON file, or an inline JSON document, holding a list of host records.
    input: String,
    /// Report destination (default: vcenter_backup_report.csv).
    output: Option<PathBuf>,
    /// Report format (default: csv).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// YAML configuration file; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker threads used to build rows (0 = auto).
    #[arg(long)]
    jobs: Option<usize>,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    log_json: bool,
}

/// A failed run, carrying the exit code it maps to.
#[derive(Debug)]
enum Failure {
    Load(PipelineError),
    NotAList(PipelineError),
    Other(PipelineError),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Load(_) => 3,
            Self::NotAList(_) => 4,
            Self::Other(_) => 1,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Load(err) => format!("failed to load input: {err}"),
            Self::NotAList(err) | Self::Other(err) => err.to_string(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(LogConfig {
        json: cli.log_json,
        verbose: cli.verbose,
    });

    match run(cli) {
        Ok(path) => println!("Wrote report to {}", path.display()),
        Err(failure) => {
            eprintln!("error: {}", failure.message());
            process::exit(failure.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, Failure> {
    let config = match &cli.config {
        Some(path) => ReportConfig::load(path).map_err(Failure::Other)?,
        None => ReportConfig::default(),
    };

    let document = load_input(&cli.input).map_err(Failure::Load)?;
    let hosts = host_records(document).map_err(Failure::NotAList)?;

    let jobs = cli.jobs.or(config.processing.jobs);
    let rows = build_rows_parallel(&hosts, jobs).map_err(Failure::Other)?;

    let path = cli.output.unwrap_or(config.output.path);
    let format = cli.format.unwrap_or(config.output.format);
    write_report(&path, &rows, format).map_err(Failure::Other)?;

    info!(hosts = hosts.len(), rows = rows.len(), path = %path.display(), "Report written");
    Ok(path)
}
