mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use telefatura_generate::{
    CheckReport, GenerationEngine, GenerationError, GenerationResult, check_dir,
};
use thiserror::Error;

use config::{FileConfig, GenerateOverrides, load_config, resolve_options};
use logging::{LogFormat, init_logging};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("{0} invoice file(s) failed the check")]
    CheckFailed(u64),
}

#[derive(Parser, Debug)]
#[command(name = "telefatura", version, about = "Telecom invoice XML fixture generator")]
struct Cli {
    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate invoice XML files.
    Generate(GenerateArgs),
    /// Check totals of previously generated invoice files.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of XML invoices to generate (default: 30000).
    #[arg(long)]
    count: Option<u64>,
    /// Fixed due date (YYYY-MM-DD); defaults to February 1st of the current year.
    #[arg(long, value_name = "YYYY-MM-DD")]
    due_date: Option<String>,
    /// Output directory for XML files (default: mock_invoices).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Seed for reproducible batches; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with a [generate] table.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Directory containing invoice_*.xml files.
    #[arg(default_value = "mock_invoices")]
    dir: PathBuf,
    /// Print the check report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        count,
        due_date,
        output,
        seed,
        config,
    } = args;

    let file_config = match &config {
        Some(path) => {
            tracing::info!(event = "config_loaded", path = %path.display());
            load_config(path)?
        }
        None => FileConfig::default(),
    };

    let overrides = GenerateOverrides {
        count,
        due_date,
        output,
        seed,
    };
    let now = chrono::Utc::now().naive_utc();
    let options = resolve_options(&file_config, overrides, now, rand::random::<u64>)?;

    tracing::info!(
        event = "options_resolved",
        count = options.count,
        seed = options.seed,
        due_date = %options.due_date,
        out_dir = %options.out_dir.display()
    );

    let timer = Instant::now();
    let result = GenerationEngine::new(options).run()?;

    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = timer.elapsed().as_millis() as u64
    );
    println!("{}", generate_summary(&result));
    Ok(())
}

fn generate_summary(result: &GenerationResult) -> String {
    format!(
        "Generated {} XML files in {}",
        result.report.invoices_written,
        result.out_dir.display()
    )
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let report = check_dir(&args.dir)?;
    let output = if args.json {
        serde_json::to_string_pretty(&report)?
    } else {
        check_summary(&report, &args.dir)
    };
    println!("{output}");
    check_outcome(&report)
}

fn check_summary(report: &CheckReport, dir: &Path) -> String {
    let mut lines: Vec<String> = report
        .issues
        .iter()
        .map(|issue| format!("{}: {}", issue.file, issue.message))
        .collect();
    lines.push(format!(
        "Checked {} XML files in {}: {} failed",
        report.files_checked,
        dir.display(),
        report.files_failed
    ));
    lines.join("\n")
}

fn check_outcome(report: &CheckReport) -> Result<(), CliError> {
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::CheckFailed(report.files_failed))
    }
}
