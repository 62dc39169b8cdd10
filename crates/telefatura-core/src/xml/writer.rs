use crate::value::Value;

use super::{ITEM_TAG, ROOT_TAG, escape};

/// Encode a value as an invoice document (`<invoice>...</invoice>`).
pub fn to_xml(value: &Value) -> String {
    to_xml_with_root(ROOT_TAG, value)
}

/// Encode a value wrapped in a single root element.
pub fn to_xml_with_root(root: &str, value: &Value) -> String {
    let mut out = String::with_capacity(4096);
    open(&mut out, root);
    write_value(&mut out, value);
    close(&mut out, root);
    out
}

/// Append the element content for `value` to `out`.
pub fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Map(map) => {
            for (key, child) in map.iter() {
                open(out, key);
                write_value(out, child);
                close(out, key);
            }
        }
        Value::List(values) => {
            for child in values {
                open(out, ITEM_TAG);
                write_value(out, child);
                close(out, ITEM_TAG);
            }
        }
        scalar => {
            if let Some(text) = scalar.scalar_text() {
                out.push_str(&escape(&text));
            }
        }
    }
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
