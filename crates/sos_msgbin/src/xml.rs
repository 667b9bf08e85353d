//! XML document form of a string table
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <Entries Count="2">
//!   <Entry Index="0">Hello</Entry>
//!   <Entry Index="1">World</Entry>
//! </Entries>
//! ```
//!
//! Entry text is kept verbatim, surrounding whitespace included. Carriage
//! returns are written as character references so that they survive the
//! line ending normalization applied when reading.

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::{Read, Write};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{Entry, Table};

const ROOT: &str = "Entries";
const ENTRY: &str = "Entry";
const COUNT: &str = "Count";
const INDEX: &str = "Index";

/// Write `table` as an XML document, entries in index order.
///
/// Fails with [`Error::MalformedInput`] when an entry holds a character XML 1.0
/// does not allow, such as an embedded null or another C0 control.
#[instrument(skip_all, fields(count = table.count()), err)]
pub fn write_xml<W: Write>(table: &Table, inner: W) -> Result<W> {
    let mut writer = Writer::new_with_indent(inner, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let count = table.count().to_string();
    let root = BytesStart::new(ROOT).with_attributes([(COUNT, count.as_str())]);

    if table.is_empty() {
        writer.write_event(Event::Empty(root))?;
    } else {
        writer.write_event(Event::Start(root))?;

        for entry in table.sorted() {
            let index = entry.index().to_string();
            let element = BytesStart::new(ENTRY).with_attributes([(INDEX, index.as_str())]);
            let text = entry.document_text();
            if let Some(c) = text.chars().find(|c| !is_xml_char(*c)) {
                return Err(Error::malformed(format!(
                    "entry {} holds U+{:04X}, which XML 1.0 cannot represent",
                    entry.index(),
                    c as u32
                )));
            }

            if text.is_empty() {
                writer.write_event(Event::Empty(element))?;
                continue;
            }

            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Text(BytesText::from_escaped(escape_text(&text))))?;
            writer.write_event(Event::End(BytesEnd::new(ENTRY)))?;
        }

        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    }

    let mut inner = writer.into_inner();
    inner.write_all(b"\n")?;

    Ok(inner)
}

/// Render `table` as an XML string
pub fn to_xml(table: &Table) -> Result<String> {
    Ok(String::from_utf8(write_xml(table, Vec::new())?)?)
}

/// Read a table from an XML stream
pub fn read_xml<R: Read>(mut reader: R) -> Result<Table> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;

    from_xml(&xml)
}

enum State {
    Prolog,
    Root { count: u32 },
    Entry { count: u32, index: u32, text: String },
    Done { count: u32 },
}

/// Parse a table from an XML document.
///
/// Fails with [`Error::MalformedInput`] when the root or an attribute is
/// missing, when `Count` disagrees with the number of `Entry` elements, or
/// when an index is duplicated or out of range.
#[instrument(skip_all, fields(len = xml.len()), err)]
pub fn from_xml(xml: &str) -> Result<Table> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut state = State::Prolog;

    let finished = loop {
        let event = reader.read_event()?;
        state = match (state, event) {
            (State::Prolog, Event::Start(e)) => State::Root {
                count: read_root(&e)?,
            },
            (State::Prolog, Event::Empty(e)) => State::Done {
                count: read_root(&e)?,
            },
            (State::Root { count }, Event::Start(e)) if e.name().as_ref() == ENTRY.as_bytes() => {
                State::Entry {
                    count,
                    index: read_number(&e, INDEX)?,
                    text: String::new(),
                }
            }
            (State::Root { count }, Event::Empty(e)) if e.name().as_ref() == ENTRY.as_bytes() => {
                entries.push(Entry::from_text(read_number(&e, INDEX)?, ""));
                State::Root { count }
            }
            (State::Root { count }, Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                debug!(element = %String::from_utf8_lossy(&name), "skipping element");
                reader.read_to_end(QName(&name))?;
                State::Root { count }
            }
            (State::Root { count }, Event::End(_)) => State::Done { count },
            (State::Entry { index, .. }, Event::Start(_) | Event::Empty(_)) => {
                return Err(Error::malformed(format!(
                    "entry {index} contains a child element"
                )))
            }
            (State::Entry { count, index, mut text }, Event::Text(e)) => {
                let raw = std::str::from_utf8(&e).map_err(|err| {
                    Error::malformed(format!("entry {index} text is not UTF-8: {err}"))
                })?;
                let normalized = normalize_line_endings(raw);
                text.push_str(&unescape(&normalized).map_err(quick_xml::Error::from)?);
                State::Entry { count, index, text }
            }
            (State::Entry { count, index, mut text }, Event::CData(e)) => {
                let raw = std::str::from_utf8(&e).map_err(|err| {
                    Error::malformed(format!("entry {index} CDATA is not UTF-8: {err}"))
                })?;
                text.push_str(&normalize_line_endings(raw));
                State::Entry { count, index, text }
            }
            (State::Entry { count, index, text }, Event::End(_)) => {
                entries.push(Entry::from_text(index, text));
                State::Root { count }
            }
            (State::Done { .. }, Event::Start(_) | Event::Empty(_)) => {
                return Err(Error::malformed("element after the root element"))
            }
            (state, Event::Eof) => break state,
            (state, _) => state,
        };
    };

    match finished {
        State::Done { count } => Table::from_document(count, entries),
        State::Prolog => Err(Error::malformed("document has no root element")),
        State::Root { .. } | State::Entry { .. } => Err(Error::malformed(format!(
            "document ends before the closing `{ROOT}` tag"
        ))),
    }
}

fn read_root(element: &BytesStart<'_>) -> Result<u32> {
    if element.name().as_ref() != ROOT.as_bytes() {
        return Err(Error::malformed(format!(
            "root element is `{}`, expected `{ROOT}`",
            String::from_utf8_lossy(element.name().as_ref())
        )));
    }

    read_number(element, COUNT)
}

fn read_number(element: &BytesStart<'_>, attribute: &str) -> Result<u32> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let value = element
        .try_get_attribute(attribute)
        .map_err(quick_xml::Error::from)?
        .ok_or_else(|| Error::malformed(format!("`{name}` has no `{attribute}` attribute")))?;
    let value = value.unescape_value().map_err(quick_xml::Error::from)?;

    value.trim().parse().map_err(|err| {
        Error::malformed(format!(
            "`{name}` attribute `{attribute}=\"{value}\"` is not a valid number: {err}"
        ))
    })
}

/// The XML 1.0 `Char` production
const fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

/// XML 1.0 end-of-line handling: `\r\n` and a lone `\r` both become `\n`
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }

    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
