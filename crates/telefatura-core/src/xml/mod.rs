//! Nested-tag XML encoding.
//!
//! Map entries become elements named after their key, list elements are each
//! wrapped in [`ITEM_TAG`], and scalars become escaped text. No attributes,
//! namespaces, CDATA or declarations are produced.

mod reader;
mod writer;

use std::borrow::Cow;

pub use reader::{MAX_DEPTH, parse_document};
pub use writer::{to_xml, to_xml_with_root, write_value};

/// Root element of every invoice document.
pub const ROOT_TAG: &str = "invoice";

/// Element wrapping each list entry.
pub const ITEM_TAG: &str = "item";

/// Escape the characters that cannot appear verbatim in element text.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
