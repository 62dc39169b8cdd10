use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::generator::generate_invoice;
use crate::invoice::Invoice;
use crate::model::{GenerateOptions, GenerationReport};
use crate::output::xml::write_invoice_xml;

pub const REPORT_FILE: &str = "generation_report.json";
const PROGRESS_EVERY: u64 = 1_000;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for writing a batch of invoice fixtures.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Generate the invoice at `index` in isolation.
    ///
    /// Each index gets its own generator seeded from the batch seed, so the
    /// result does not depend on which invoices were generated before it.
    pub fn generate_one(&self, index: u64) -> Invoice {
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.options.seed, index));
        generate_invoice(
            index,
            self.options.due_date,
            self.options.reference,
            &mut rng,
        )
    }

    pub fn run(&self) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let out_dir = self.options.out_dir.clone();
        if out_dir.as_os_str().is_empty() {
            return Err(GenerationError::InvalidOptions(
                "output directory must not be empty".to_string(),
            ));
        }
        std::fs::create_dir_all(&out_dir)?;

        let mut report =
            GenerationReport::new(run_id.clone(), self.options.seed, self.options.count);

        info!(
            run_id = %run_id,
            count = self.options.count,
            seed = self.options.seed,
            out_dir = %out_dir.display(),
            "generation started"
        );

        let outcome = self.write_invoices(&out_dir, &mut report);
        report.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                write_report(&out_dir, &report)?;
                info!(
                    run_id = %run_id,
                    invoices = report.invoices_written,
                    bytes_written = report.bytes_written,
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(GenerationResult { out_dir, report })
            }
            Err(err) => {
                report.record_failure(err.to_string());
                warn!(
                    run_id = %run_id,
                    error = %err,
                    invoices = report.invoices_written,
                    "generation failed"
                );
                if let Err(report_err) = write_report(&out_dir, &report) {
                    warn!(run_id = %run_id, error = %report_err, "report not written");
                }
                Err(err)
            }
        }
    }

    fn write_invoices(
        &self,
        out_dir: &Path,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        for index in 0..self.options.count {
            let invoice = self.generate_one(index);
            let file_name = invoice_file_name(index);
            let path = out_dir.join(&file_name);
            let bytes = write_invoice_xml(&path, &invoice.to_value()).map_err(|err| {
                std::io::Error::new(err.kind(), format!("{}: {err}", path.display()))
            })?;

            let categories: Vec<&str> = invoice.items.iter().map(|item| item.category).collect();
            report.record_invoice(&file_name, &categories, invoice.totals.grand_total, bytes);
            debug!(file = %file_name, items = categories.len(), bytes, "invoice written");

            let written = index + 1;
            if written % PROGRESS_EVERY == 0 {
                info!(written, total = self.options.count, "generation progress");
            }
        }
        Ok(())
    }
}

/// File name for the invoice at zero-based `index`.
pub fn invoice_file_name(index: u64) -> String {
    format!("invoice_{:04}.xml", index + 1)
}

fn write_report(out_dir: &Path, report: &GenerationReport) -> Result<(), GenerationError> {
    let path = out_dir.join(REPORT_FILE);
    std::fs::write(&path, serde_json::to_vec_pretty(report)?)?;
    Ok(())
}

fn hash_seed(seed: u64, index: u64) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    hash ^= index.wrapping_mul(0x9e3779b97f4a7c15);
    hash = hash.wrapping_mul(0x100000001b3);
    hash
}
