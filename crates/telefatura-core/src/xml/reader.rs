use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::value::{Map, Value};

use super::ITEM_TAG;

/// Deepest element nesting accepted by [`parse_document`].
pub const MAX_DEPTH: usize = 256;

/// Read a nested-tag document back into a value tree.
///
/// Returns the root element name and its content. Every scalar comes back as
/// [`Value::Text`]; an element whose children are all [`ITEM_TAG`] becomes a
/// list, any other element with children becomes a map. Declarations,
/// comments and whitespace between elements are skipped.
pub fn parse_document(input: &str) -> Result<(String, Value)> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|err| Error::Malformed {
            offset: reader.error_position() as usize,
            message: err.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(malformed(offset, "trailing content after root element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(malformed(
                        offset,
                        format!("elements nested deeper than {MAX_DEPTH}"),
                    ));
                }
                stack.push(Frame::new(element_name(&start, offset)?, offset));
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(malformed(offset, "trailing content after root element"));
                }
                let name = element_name(&start, offset)?;
                attach(&mut stack, &mut root, name, Value::Text(String::new()));
            }
            Event::Text(text) => {
                let decoded = text
                    .unescape()
                    .map_err(|err| malformed(offset, err.to_string()))?;
                match stack.last_mut() {
                    Some(frame) => frame.push_text(&decoded, offset),
                    None if decoded.trim().is_empty() => {}
                    None => return Err(malformed(offset, "text outside root element")),
                }
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let text = std::str::from_utf8(&raw)
                    .map_err(|err| malformed(offset, err.to_string()))?;
                match stack.last_mut() {
                    Some(frame) => frame.push_text(text, offset),
                    None => return Err(malformed(offset, "text outside root element")),
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| malformed(offset, "unexpected closing tag"))?;
                let (name, value) = frame.finish()?;
                attach(&mut stack, &mut root, name, value);
            }
            Event::Eof => {
                if let Some(frame) = stack.last() {
                    return Err(malformed(
                        offset,
                        format!("unexpected end of input inside <{}>", frame.name),
                    ));
                }
                return root.ok_or_else(|| malformed(offset, "missing root element"));
            }
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }
}

/// Element being read, with its accumulated text and children.
struct Frame {
    name: String,
    text: String,
    text_offset: usize,
    children: Vec<(String, Value)>,
}

impl Frame {
    fn new(name: String, offset: usize) -> Self {
        Self {
            name,
            text: String::new(),
            text_offset: offset,
            children: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str, offset: usize) {
        if self.text.is_empty() {
            self.text_offset = offset;
        }
        self.text.push_str(text);
    }

    fn finish(self) -> Result<(String, Value)> {
        let Frame {
            name,
            text,
            text_offset,
            children,
        } = self;

        if children.is_empty() {
            return Ok((name, Value::Text(text)));
        }
        if !text.trim().is_empty() {
            return Err(malformed(
                text_offset,
                format!("mixed text and elements inside <{name}>"),
            ));
        }
        let value = if children.iter().all(|(child, _)| child == ITEM_TAG) {
            Value::List(children.into_iter().map(|(_, value)| value).collect())
        } else {
            Value::Map(children.into_iter().collect::<Map>())
        };
        Ok((name, value))
    }
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some((name, value)),
    }
}

fn element_name(start: &BytesStart<'_>, offset: usize) -> Result<String> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|err| malformed(offset, err.to_string()))
}

fn malformed(offset: usize, message: impl Into<String>) -> Error {
    Error::Malformed {
        offset,
        message: message.into(),
    }
}
