//! Types for reading message bin string tables
//!

use byteorder::{ByteOrder, LittleEndian};
use std::io::Read;
use tracing::{debug, instrument, trace};
use widestring::{U16Str, U16String};

use crate::error::{Error, Result};
use crate::types::{Entry, Table};

const OFFSET_SIZE: usize = 4;
const TERMINATOR_SIZE: usize = 2;

/// Decode a complete message bin buffer into a [`Table`].
///
/// The entry count is derived from the first offset, which always points just
/// past the header. Each entry runs from its own offset to the next one (or to
/// the end of the buffer for the last entry) and ends in a two byte terminator
/// that is located by position, not scanned for.
///
/// ```
/// let bytes = [0x04, 0, 0, 0, 0x48, 0, 0x69, 0, 0, 0];
/// let table = sos_msgbin::decode(&bytes).unwrap();
///
/// assert_eq!(table.count(), 1);
/// assert_eq!(table[0].text_lossy(), "Hi");
/// ```
#[instrument(skip_all, fields(len = bytes.len()), err)]
pub fn decode(bytes: &[u8]) -> Result<Table> {
    let first_offset = bytes.get(..OFFSET_SIZE).map(LittleEndian::read_u32).ok_or_else(|| {
        Error::malformed(format!(
            "buffer is {} bytes, too short for an offset header",
            bytes.len()
        ))
    })?;

    if first_offset as usize % OFFSET_SIZE != 0 {
        return Err(Error::malformed(format!(
            "first offset {first_offset} is not a multiple of {OFFSET_SIZE}"
        )));
    }

    let count = first_offset / OFFSET_SIZE as u32;
    let header_len = first_offset as usize;
    let header = bytes.get(..header_len).ok_or_else(|| {
        Error::malformed(format!(
            "header of {count} offsets needs {header_len} bytes but the buffer is {} bytes",
            bytes.len()
        ))
    })?;

    let offsets: Vec<usize> = header
        .chunks_exact(OFFSET_SIZE)
        .map(|chunk| LittleEndian::read_u32(chunk) as usize)
        .collect();
    debug!(count, "read offset header");

    let ends = offsets
        .iter()
        .skip(1)
        .copied()
        .chain(std::iter::once(bytes.len()));

    let entries = (0u32..)
        .zip(offsets.iter().copied().zip(ends))
        .map(|(index, (start, end))| read_entry(bytes, header_len, index, start, end))
        .collect::<Result<Vec<_>>>()?;

    Ok(Table::new(count, entries))
}

fn read_entry(bytes: &[u8], header_len: usize, index: u32, start: usize, end: usize) -> Result<Entry> {
    if start < header_len {
        return Err(Error::malformed(format!(
            "entry {index} starts at {start}, inside the {header_len} byte header"
        )));
    }
    if end < start {
        return Err(Error::malformed(format!(
            "entry {index} ends at {end} before it starts at {start}"
        )));
    }

    let span = bytes.get(start..end).ok_or_else(|| {
        Error::malformed(format!(
            "entry {index} spans {start}..{end}, past the end of the {} byte buffer",
            bytes.len()
        ))
    })?;

    let text_len = span.len().checked_sub(TERMINATOR_SIZE).ok_or_else(|| {
        Error::malformed(format!(
            "entry {index} is {} bytes, no room for a terminator",
            span.len()
        ))
    })?;
    if text_len % 2 != 0 {
        return Err(Error::malformed(format!(
            "entry {index} holds {text_len} text bytes, not a whole number of UTF-16 units"
        )));
    }

    let (text, terminator) = span.split_at(text_len);
    if terminator.iter().any(|&b| b != 0) {
        debug!(index, ?terminator, "entry terminator is not null");
    }

    let mut units = vec![0u16; text_len / 2];
    LittleEndian::read_u16_into(text, &mut units);
    trace!(index, start, units = units.len(), "read entry");

    Ok(Entry::new(index, U16String::from_vec(units)))
}

/// Message bin reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_entries(reader: impl Read) -> sos_msgbin::error::Result<()> {
///     let bin = sos_msgbin::StringTableReader::new(reader)?;
///
///     for entry in bin.table() {
///         println!("{}: {}", entry.index(), entry.text().display());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StringTableReader {
    table: Table,
}

impl StringTableReader {
    /// Read a whole message bin stream and parse its entries.
    pub fn new<R: Read>(mut reader: R) -> Result<StringTableReader> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        Ok(StringTableReader {
            table: decode(&buffer)?,
        })
    }

    /// Number of entries contained in this file
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether this file contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a reference to the decoded table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Try to get the text of an entry by its index
    pub fn by_index(&self, index: u32) -> Option<&U16Str> {
        self.table.by_index(index).map(Entry::text)
    }

    /// Take the decoded table out of the reader
    pub fn into_table(self) -> Table {
        self.table
    }
}
