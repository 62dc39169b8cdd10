use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use telefatura_generate::engine::REPORT_FILE;
use telefatura_generate::{
    GenerateOptions, GenerationEngine, GenerationError, GenerationReport, check_dir,
};

fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn options(out_dir: PathBuf, count: u64, seed: u64) -> GenerateOptions {
    let due_date = NaiveDate::from_ymd_opt(2024, 2, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid due date");
    let reference = NaiveDate::from_ymd_opt(2024, 3, 10)
        .and_then(|date| date.and_hms_micro_opt(8, 15, 30, 123_456))
        .expect("valid reference");
    GenerateOptions {
        out_dir,
        count,
        due_date,
        seed,
        reference,
    }
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "telefatura_generate_{label}_{}",
        uuid::Uuid::new_v4()
    ));
    dir
}

fn xml_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read out dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".xml"))
        .collect();
    names.sort();
    names
}

#[test]
fn run_writes_one_file_per_invoice() {
    let out_dir = temp_out_dir("count");
    let engine = GenerationEngine::new(options(out_dir.join("nested"), 12, 7));
    let result = engine.run().expect("run generation");

    let names = xml_files(&result.out_dir);
    assert_eq!(names.len(), 12);
    assert_eq!(names.first().map(String::as_str), Some("invoice_0001.xml"));
    assert_eq!(names.last().map(String::as_str), Some("invoice_0012.xml"));

    let first = fs::read_to_string(result.out_dir.join("invoice_0001.xml")).expect("read xml");
    assert!(first.starts_with("<invoice><tipo>fatura_telecom</tipo><operadora>"));
    assert!(first.ends_with("</auditoria></invoice>"));
    assert!(first.contains("<vencimento>2024-02-01T00:00:00Z</vencimento>"));
    assert!(first.contains("<cnpj>10000000/0001-10</cnpj>"));
}

#[test]
fn run_writes_report() {
    let out_dir = temp_out_dir("report");
    let engine = GenerationEngine::new(options(out_dir, 5, 3));
    let result = engine.run().expect("run generation");

    let report: GenerationReport = serde_json::from_str(
        &fs::read_to_string(result.out_dir.join(REPORT_FILE)).expect("read report"),
    )
    .expect("parse report");

    assert_eq!(report.invoices_requested, 5);
    assert_eq!(report.invoices_written, 5);
    assert_eq!(report.seed, 3);
    assert!((10..=25).contains(&report.items_total));
    assert_eq!(
        report.category_usage.values().sum::<u64>(),
        report.items_total
    );
    assert_eq!(report.last_file.as_deref(), Some("invoice_0005.xml"));

    let bytes_on_disk: u64 = xml_files(&result.out_dir)
        .iter()
        .map(|name| {
            fs::metadata(result.out_dir.join(name))
                .map(|meta| meta.len())
                .unwrap_or(0)
        })
        .sum();
    assert_eq!(report.bytes_written, bytes_on_disk);
    assert_eq!(report.run_id, result.report.run_id);
}

#[test]
fn same_seed_produces_identical_files() {
    let result_a = GenerationEngine::new(options(temp_out_dir("seed_a"), 8, 42))
        .run()
        .expect("run generation A");
    let result_b = GenerationEngine::new(options(temp_out_dir("seed_b"), 8, 42))
        .run()
        .expect("run generation B");

    for name in xml_files(&result_a.out_dir) {
        let hash_a = hash_file(&result_a.out_dir.join(&name)).expect("hash A");
        let hash_b = hash_file(&result_b.out_dir.join(&name)).expect("hash B");
        assert_eq!(hash_a, hash_b, "{name} should be deterministic");
    }
}

#[test]
fn invoices_do_not_depend_on_batch_size() {
    let small = GenerationEngine::new(options(temp_out_dir("small"), 3, 9));
    let large = GenerationEngine::new(options(temp_out_dir("large"), 30, 9));

    assert_eq!(small.generate_one(2), large.generate_one(2));
    assert_ne!(small.generate_one(1), small.generate_one(2));
}

#[test]
fn generated_batch_passes_check() {
    let result = GenerationEngine::new(options(temp_out_dir("check"), 20, 5))
        .run()
        .expect("run generation");

    let report = check_dir(&result.out_dir).expect("check dir");
    assert_eq!(report.files_checked, 20);
    assert!(report.is_clean(), "issues: {:?}", report.issues);
}

#[test]
fn check_flags_tampered_and_malformed_files() {
    let result = GenerationEngine::new(options(temp_out_dir("tamper"), 3, 11))
        .run()
        .expect("run generation");

    let path = result.out_dir.join("invoice_0002.xml");
    let contents = fs::read_to_string(&path).expect("read xml");
    let start = contents.find("<totalGeral>").expect("totalGeral tag") + "<totalGeral>".len();
    let end = contents[start..].find('<').expect("closing tag") + start;
    let tampered = format!("{}0.01{}", &contents[..start], &contents[end..]);
    fs::write(&path, tampered).expect("write tampered xml");

    fs::write(result.out_dir.join("invoice_0003.xml"), "<invoice><tipo>").expect("write broken xml");

    let report = check_dir(&result.out_dir).expect("check dir");
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.files_failed, 2);
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.file == "invoice_0002.xml" && issue.message.contains("totalGeral")));
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.file == "invoice_0003.xml" && issue.message.contains("malformed")));
}

#[test]
fn write_failure_aborts_batch_and_records_report() {
    let out_dir = temp_out_dir("write_failure");
    fs::create_dir_all(out_dir.join("invoice_0002.xml")).expect("block second file");

    let err = GenerationEngine::new(options(out_dir.clone(), 5, 13))
        .run()
        .expect_err("second write should fail");

    assert!(matches!(err, GenerationError::Io(_)));
    assert!(err.to_string().contains("invoice_0002.xml"), "{err}");
    assert!(out_dir.join("invoice_0001.xml").is_file());
    assert!(!out_dir.join("invoice_0003.xml").exists());
    assert!(!out_dir.join("invoice_0005.xml").exists());

    let report: GenerationReport = serde_json::from_str(
        &fs::read_to_string(out_dir.join(REPORT_FILE)).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(report.invoices_requested, 5);
    assert_eq!(report.invoices_written, 1);
    assert_eq!(report.last_file.as_deref(), Some("invoice_0001.xml"));
    assert!(
        report
            .error
            .as_deref()
            .is_some_and(|message| message.contains("invoice_0002.xml"))
    );
}

#[test]
fn empty_output_dir_is_rejected() {
    let err = GenerationEngine::new(options(PathBuf::new(), 1, 1))
        .run()
        .expect_err("empty out dir");
    assert!(matches!(err, GenerationError::InvalidOptions(_)));
}

#[test]
fn check_reports_deeply_nested_file_as_failure() {
    let result = GenerationEngine::new(options(temp_out_dir("deep"), 2, 21))
        .run()
        .expect("run generation");
    fs::write(result.out_dir.join("invoice_0003.xml"), "<a>".repeat(200_000))
        .expect("write nested xml");

    let report = check_dir(&result.out_dir).expect("check dir");
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.files_failed, 1);
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.file == "invoice_0003.xml" && issue.message.contains("nested deeper")));
}
