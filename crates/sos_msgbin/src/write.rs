//! Types for writing message bin string tables
//!

use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt::Debug;
use std::io::Write;
use tracing::{debug, instrument, trace};
use widestring::U16Str;

use crate::error::{Error, Result};
use crate::types::{Entry, Table};

/// Message bin generator
///
/// Strings are appended in index order. The offset header can only be laid out
/// once every string is known, so the blob is buffered and everything is
/// written to the inner writer by [`StringTableWriter::finish`].
///
/// ```
/// # fn doit() -> sos_msgbin::error::Result<()>
/// # {
/// use sos_msgbin::StringTableWriter;
/// use widestring::u16str;
///
/// let mut bin = StringTableWriter::new(Vec::new());
/// bin.push(u16str!("Hi"))?;
///
/// let bytes = bin.finish()?;
/// assert_eq!(bytes, [0x04, 0, 0, 0, 0x48, 0, 0x69, 0, 0, 0]);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct StringTableWriter<W: Write> {
    inner: W,
    offsets: Vec<u32>,
    blob: Vec<u8>,
}

impl<W: Write> Debug for StringTableWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringTableWriter")
            .field("entries", &self.offsets.len())
            .field("blob_len", &self.blob.len())
            .finish()
    }
}

impl<W: Write> StringTableWriter<W> {
    pub fn new(inner: W) -> StringTableWriter<W> {
        StringTableWriter {
            inner,
            offsets: Vec::new(),
            blob: Vec::new(),
        }
    }

    /// Number of strings appended so far
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Append a string and its terminator, returning the index it was given.
    pub fn push(&mut self, text: &U16Str) -> Result<u32> {
        let index = u32::try_from(self.offsets.len())
            .map_err(|_| Error::invalid("too many entries for a 32-bit header"))?;
        let offset = u32::try_from(self.blob.len())
            .map_err(|_| Error::invalid("string blob exceeds 32-bit offsets"))?;

        self.blob.reserve((text.len() + 1) * 2);
        for unit in text.as_slice() {
            self.blob.write_u16::<LittleEndian>(*unit)?;
        }
        self.blob.write_u16::<LittleEndian>(0)?;

        trace!(index, offset, units = text.len(), "appended entry");
        self.offsets.push(offset);

        Ok(index)
    }

    /// Write the offset header followed by the string blob
    ///
    /// An empty table is written as a single zero offset so that the result
    /// still carries a readable header.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        if self.offsets.is_empty() {
            self.inner.write_u32::<LittleEndian>(0)?;
            return Ok(self.inner);
        }

        let header_len = u32::try_from(self.offsets.len() * 4)
            .map_err(|_| Error::invalid("offset header exceeds 32 bits"))?;

        for offset in &self.offsets {
            let absolute = header_len
                .checked_add(*offset)
                .ok_or_else(|| Error::invalid("string blob exceeds 32-bit offsets"))?;
            self.inner.write_u32::<LittleEndian>(absolute)?;
        }
        self.inner.write_all(&self.blob)?;

        debug!(
            entries = self.offsets.len(),
            header_len,
            blob_len = self.blob.len(),
            "finished string table"
        );

        Ok(self.inner)
    }
}

/// Encode a [`Table`] into message bin bytes.
///
/// Entries are laid out in ascending index order whatever order the table
/// holds them in. Fails with [`Error::InvalidTable`] unless the indices are
/// exactly `0..count`.
#[instrument(skip_all, fields(count = table.count()), err)]
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    let entries = sorted_entries(table)?;

    let capacity = entries.len() * 4 + entries.iter().map(|e| e.encoded_len()).sum::<usize>();
    let mut bin = StringTableWriter::new(Vec::with_capacity(capacity.max(4)));
    for entry in entries {
        bin.push(entry.text())?;
    }

    bin.finish()
}

/// Entries sorted by index, checked to be dense and to match the declared count
fn sorted_entries(table: &Table) -> Result<Vec<&Entry>> {
    let entries = table.sorted();

    for (expected, entry) in (0u32..).zip(&entries) {
        match entry.index() {
            index if index == expected => {}
            index if index < expected => {
                return Err(Error::invalid(format!("index {index} appears more than once")))
            }
            _ => return Err(Error::invalid(format!("index {expected} is missing"))),
        }
    }

    if entries.len() != table.count() as usize {
        return Err(Error::invalid(format!(
            "table declares {} entries but holds {}",
            table.count(),
            entries.len()
        )));
    }

    Ok(entries)
}
