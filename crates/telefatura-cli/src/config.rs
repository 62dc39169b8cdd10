use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use telefatura_generate::GenerateOptions;
use telefatura_generate::model::{DEFAULT_COUNT, DEFAULT_OUT_DIR, default_due_date};

use crate::CliError;

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional TOML config file.
///
/// ```toml
/// [generate]
/// count = 500
/// due_date = "2024-02-01"
/// output = "fixtures/invoices"
/// seed = 42
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub generate: GenerateSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSection {
    pub count: Option<u64>,
    pub due_date: Option<String>,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Default, Clone)]
pub struct GenerateOverrides {
    pub count: Option<u64>,
    pub due_date: Option<String>,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
}

pub fn load_config(path: &Path) -> Result<FileConfig, CliError> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(CliError::from)
}

/// Merge overrides, file values and defaults into engine options.
///
/// A missing seed is drawn by `fallback_seed`; the due date defaults to
/// February 1st of the `now` year.
pub fn resolve_options(
    file: &FileConfig,
    overrides: GenerateOverrides,
    now: NaiveDateTime,
    fallback_seed: impl FnOnce() -> u64,
) -> Result<GenerateOptions, CliError> {
    let section = &file.generate;

    let due_date = match overrides.due_date.or_else(|| section.due_date.clone()) {
        Some(raw) => parse_due_date(&raw)?,
        None => default_due_date(now),
    };

    Ok(GenerateOptions {
        out_dir: overrides
            .output
            .or_else(|| section.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
        count: overrides.count.or(section.count).unwrap_or(DEFAULT_COUNT),
        due_date,
        seed: overrides.seed.or(section.seed).unwrap_or_else(fallback_seed),
        reference: now,
    })
}

/// Parse a `YYYY-MM-DD` due date as midnight.
pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, CliError> {
    NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|err| CliError::InvalidConfig(format!("invalid due date '{raw}': {err}")))
}
