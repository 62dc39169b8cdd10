//! Core contracts for telefatura.
//!
//! This crate defines the ordered value tree that invoices are built into,
//! the two-decimal rounding used for monetary amounts, and the nested-tag XML
//! encoding (plus its reader) shared by the generator and the CLI.

pub mod error;
pub mod money;
pub mod value;
pub mod xml;

pub use error::{Error, Result};
pub use money::round2;
pub use value::{Map, Value};
pub use xml::{ITEM_TAG, MAX_DEPTH, ROOT_TAG, escape, parse_document, to_xml};
