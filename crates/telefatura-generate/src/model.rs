use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where invoice files are written.
    pub out_dir: PathBuf,
    /// Number of invoices to generate.
    pub count: u64,
    /// Due date stamped on every invoice.
    pub due_date: NaiveDateTime,
    /// Batch seed; each invoice derives its own seed from it.
    pub seed: u64,
    /// Instant billing periods are drawn back from.
    pub reference: NaiveDateTime,
}

pub const DEFAULT_COUNT: u64 = 30_000;
pub const DEFAULT_OUT_DIR: &str = "mock_invoices";

impl Default for GenerateOptions {
    fn default() -> Self {
        let now = Utc::now().naive_utc();
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            count: DEFAULT_COUNT,
            due_date: default_due_date(now),
            seed: 0,
            reference: now,
        }
    }
}

/// February 1st of the reference year, at midnight.
pub fn default_due_date(reference: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(reference.year(), 2, 1)
        .unwrap_or(reference.date())
        .and_time(NaiveTime::MIN)
}

/// Report for a generation run, written as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub invoices_requested: u64,
    pub invoices_written: u64,
    pub items_total: u64,
    pub category_usage: BTreeMap<String, u64>,
    pub amount_total: f64,
    pub bytes_written: u64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, invoices_requested: u64) -> Self {
        Self {
            run_id,
            seed,
            invoices_requested,
            invoices_written: 0,
            items_total: 0,
            category_usage: BTreeMap::new(),
            amount_total: 0.0,
            bytes_written: 0,
            duration_ms: 0,
            first_file: None,
            last_file: None,
            error: None,
        }
    }

    pub fn record_invoice(
        &mut self,
        file_name: &str,
        categories: &[&str],
        grand_total: f64,
        bytes: u64,
    ) {
        self.invoices_written += 1;
        self.items_total += categories.len() as u64;
        for category in categories {
            *self.category_usage.entry(category.to_string()).or_insert(0) += 1;
        }
        self.amount_total = telefatura_core::round2(self.amount_total + grand_total);
        self.bytes_written = self.bytes_written.saturating_add(bytes);
        if self.first_file.is_none() {
            self.first_file = Some(file_name.to_string());
        }
        self.last_file = Some(file_name.to_string());
    }

    pub fn record_failure(&mut self, message: String) {
        self.error = Some(message);
    }
}
