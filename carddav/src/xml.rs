// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities for WebDAV/CardDAV processing.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CardDavError;

/// XML namespaces used in `CardDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CardDAV` namespace.
    pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";

    /// Calendar server extensions, home of `getctag`.
    pub const CALENDAR_SERVER: &str = "http://calendarserver.org/ns/";
}

/// Writer producing an indented request body.
pub type BodyWriter = Writer<Cursor<Vec<u8>>>;

/// Creates a writer for a request body.
pub fn body_writer() -> BodyWriter {
    Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
}

/// Finishes a request body.
///
/// # Errors
///
/// Returns an error if the written bytes are not UTF-8.
pub fn finish(writer: BodyWriter) -> Result<String, CardDavError> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CardDavError::Xml(format!("UTF-8 error: {e}")))
}

/// Writes `<name>text</name>`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_text_element(
    writer: &mut BodyWriter,
    name: &str,
    text: &str,
) -> Result<(), CardDavError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Reads the text content of the element whose start tag was just consumed,
/// up to and including its end tag.
///
/// Entity references are resolved and surrounding whitespace is trimmed.
///
/// # Errors
///
/// Returns an error if XML parsing fails.
pub fn read_element_text<R: std::io::BufRead>(
    reader: &mut quick_xml::Reader<R>,
) -> Result<String, quick_xml::Error> {
    let mut text = String::new();
    let mut depth = 1;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(e) => text.push_str(&e.decode()?),
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    text.push(ch);
                } else {
                    let name = e.decode()?;
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => text.push_str(resolved),
                        // Unknown entities are kept verbatim.
                        None => {
                            text.push('&');
                            text.push_str(&name);
                            text.push(';');
                        }
                    }
                }
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text.trim().to_string())
}
