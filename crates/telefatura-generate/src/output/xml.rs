use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use telefatura_core::{Value, to_xml};

/// Write a value as an invoice document, returning the bytes written.
pub fn write_invoice_xml(path: &Path, value: &Value) -> std::io::Result<u64> {
    let xml = to_xml(value);
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(xml.as_bytes())?;
    writer.flush()?;
    Ok(xml.len() as u64)
}
