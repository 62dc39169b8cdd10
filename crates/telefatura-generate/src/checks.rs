use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use telefatura_core::{ROOT_TAG, Value, parse_document, round2};

use crate::catalog::{TaxKind, category};
use crate::errors::GenerationError;

/// Tolerance when comparing amounts read back as text.
const CENT_EPSILON: f64 = 0.005;

/// A consistency problem found in one invoice file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckIssue {
    pub file: String,
    pub message: String,
}

/// Outcome of checking a directory of invoice files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub files_checked: u64,
    pub files_failed: u64,
    pub issues: Vec<CheckIssue>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.files_failed == 0
    }
}

/// Check every `*.xml` file in `dir`, in file name order.
///
/// Unreadable or malformed files count as failures; only directory listing
/// errors abort the check.
pub fn check_dir(dir: &Path) -> Result<CheckReport, GenerationError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();

    let mut report = CheckReport::default();
    for path in files {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let messages = match check_file(&path) {
            Ok(messages) => messages,
            Err(err) => vec![err.to_string()],
        };

        report.files_checked += 1;
        if !messages.is_empty() {
            report.files_failed += 1;
            debug!(file = %file, issues = messages.len(), "invoice failed check");
        }
        report.issues.extend(messages.into_iter().map(|message| CheckIssue {
            file: file.clone(),
            message,
        }));
    }

    info!(
        dir = %dir.display(),
        files_checked = report.files_checked,
        files_failed = report.files_failed,
        "check completed"
    );
    Ok(report)
}

/// Parse one file and return its consistency problems.
pub fn check_file(path: &Path) -> Result<Vec<String>, GenerationError> {
    let contents = std::fs::read_to_string(path)?;
    let (root, value) = parse_document(&contents)?;
    let mut messages = Vec::new();
    if root != ROOT_TAG {
        messages.push(format!("unexpected root element <{root}>"));
    }
    messages.extend(check_invoice(&value));
    Ok(messages)
}

/// Check the totals of an invoice tree.
///
/// Works on typed trees and on trees read back from XML, where every scalar
/// is text.
pub fn check_invoice(invoice: &Value) -> Vec<String> {
    let mut messages = Vec::new();

    let items: &[Value] = match invoice.get("itens") {
        Some(Value::List(items)) => items.as_slice(),
        // A document with an empty item list reads back as empty text.
        Some(value) if value.is_scalar() => &[],
        _ => {
            messages.push("missing itens".to_string());
            &[]
        }
    };

    let mut services = 0.0;
    let mut taxes_by_kind = [0.0_f64; 3];

    for (position, item) in items.iter().enumerate() {
        let label = format!("item {}", position + 1);

        if let Some(code) = item.get("categoria").and_then(Value::as_str) {
            if category(code).is_none() {
                messages.push(format!("{label}: unknown categoria '{code}'"));
            }
        }

        let Some(base_value) = number(item, "valorBase", &label, &mut messages) else {
            continue;
        };
        let taxes = item
            .get("impostos")
            .and_then(Value::as_list)
            .unwrap_or_default();
        if taxes.len() != TaxKind::ALL.len() {
            messages.push(format!(
                "{label}: expected {} impostos, found {}",
                TaxKind::ALL.len(),
                taxes.len()
            ));
        }

        let mut tax_sum = 0.0;
        for tax in taxes {
            let Some(amount) = number(tax, "valor", &label, &mut messages) else {
                continue;
            };
            tax_sum += amount;
            let kind = tax.get("tipo").and_then(Value::as_str);
            if let Some(slot) = TaxKind::ALL
                .iter()
                .position(|candidate| Some(candidate.code()) == kind)
            {
                taxes_by_kind[slot] += amount;
            }
        }

        if let Some(total) = number(item, "total", &label, &mut messages) {
            let expected = round2(base_value + tax_sum);
            if !same_cents(total, expected) {
                messages.push(format!("{label}: total {total} != {expected}"));
            }
        }
        services += base_value;
    }

    let Some(totals) = invoice.get("totais") else {
        messages.push("missing totais".to_string());
        return messages;
    };

    let services_total = number(totals, "valorServicosSemImpostos", "totais", &mut messages);
    let taxes_total = number(totals, "totalImpostos", "totais", &mut messages);
    let grand_total = number(totals, "totalGeral", "totais", &mut messages);

    if let Some(services_total) = services_total {
        if !same_cents(services_total, round2(services)) {
            messages.push(format!(
                "totais: valorServicosSemImpostos {services_total} != {}",
                round2(services)
            ));
        }
    }
    if let Some(taxes_total) = taxes_total {
        let expected = round2(taxes_by_kind.iter().sum());
        if !same_cents(taxes_total, expected) {
            messages.push(format!("totais: totalImpostos {taxes_total} != {expected}"));
        }
    }
    if let (Some(services_total), Some(taxes_total), Some(grand_total)) =
        (services_total, taxes_total, grand_total)
    {
        let expected = round2(services_total + taxes_total);
        if !same_cents(grand_total, expected) {
            messages.push(format!("totais: totalGeral {grand_total} != {expected}"));
        }
    }

    messages
}

fn number(value: &Value, key: &str, label: &str, messages: &mut Vec<String>) -> Option<f64> {
    let parsed = value.get(key).and_then(Value::as_f64);
    if parsed.is_none() {
        messages.push(format!("{label}: missing or non-numeric {key}"));
    }
    parsed
}

fn same_cents(left: f64, right: f64) -> bool {
    (left - right).abs() < CENT_EPSILON
}
