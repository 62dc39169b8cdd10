//! Telecom invoice fixture generator for telefatura.
//!
//! This crate samples fake invoices from a fixed catalog, encodes them with
//! the nested-tag XML dialect from `telefatura-core`, and writes deterministic
//! batches of files.

pub mod catalog;
pub mod checks;
pub mod engine;
pub mod errors;
pub mod generator;
pub mod invoice;
pub mod model;
pub mod output;

pub use checks::{CheckIssue, CheckReport, check_dir, check_invoice};
pub use engine::{GenerationEngine, GenerationResult, invoice_file_name};
pub use errors::GenerationError;
pub use generator::generate_invoice;
pub use invoice::Invoice;
pub use model::{GenerateOptions, GenerationReport};
