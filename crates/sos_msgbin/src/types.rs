//! In-memory string table model shared by the binary codec and the document formats
//!

use derive_more::derive::{Constructor, Deref, IntoIterator};
use tracing::warn;
use widestring::{U16Str, U16String};

use crate::error::{Error, Result};

/// A single string of the table, identified by its slot in the offset header.
#[derive(Constructor, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entry {
    index: u32,
    text: U16String,
}

impl Entry {
    /// Build an entry from UTF-8 text
    pub fn from_text(index: u32, text: impl AsRef<str>) -> Self {
        Self::new(index, U16String::from_str(text.as_ref()))
    }

    /// Position of this entry in the offset header
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Raw UTF-16 text, terminator excluded
    pub fn text(&self) -> &U16Str {
        self.text.as_ustr()
    }

    /// Text as a Rust string, unpaired surrogates replaced with U+FFFD
    pub fn text_lossy(&self) -> String {
        self.text.to_string_lossy()
    }

    /// Number of bytes this entry occupies in the blob, terminator included
    pub fn encoded_len(&self) -> usize {
        (self.text.len() + 1) * 2
    }

    /// Take the raw UTF-16 text out of the entry
    pub fn into_text(self) -> U16String {
        self.text
    }

    /// Text for a document, warning when it cannot be represented exactly
    pub(crate) fn document_text(&self) -> String {
        match self.text.to_string() {
            Ok(text) => text,
            Err(_) => {
                warn!(
                    index = self.index,
                    "entry holds unpaired surrogates, replacing them with U+FFFD"
                );
                self.text_lossy()
            }
        }
    }
}

/// An ordered string table.
///
/// A valid table declares a `count` equal to the number of entries and holds
/// every index in `0..count` exactly once. Tables assembled by hand through
/// [`Table::new`] are not checked until they are encoded.
///
/// ```
/// use sos_msgbin::types::Table;
///
/// let table = Table::from_texts(["Hello", "World"]);
/// assert_eq!(table.count(), 2);
/// assert_eq!(table.by_index(1).unwrap().text_lossy(), "World");
/// ```
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq, Deref, IntoIterator)]
pub struct Table {
    count: u32,
    #[deref]
    #[into_iterator(owned, ref)]
    entries: Vec<Entry>,
}

impl Table {
    /// Build a dense table, assigning indices in iteration order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<Entry> = (0u32..)
            .zip(texts)
            .map(|(index, text)| Entry::from_text(index, text))
            .collect();
        let count = u32::try_from(entries.len()).unwrap_or(u32::MAX);

        Self::new(count, entries)
    }

    /// Number of entries the table declares
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Entries in the order they were supplied
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Build a table from entries read out of a document.
    ///
    /// Every index in `0..count` must appear exactly once; the result is
    /// sorted by index.
    pub(crate) fn from_document(count: u32, mut entries: Vec<Entry>) -> Result<Self> {
        if entries.len() != count as usize {
            return Err(Error::malformed(format!(
                "document declares {count} entries but holds {}",
                entries.len()
            )));
        }

        let mut seen = vec![false; entries.len()];
        for entry in &entries {
            let slot = seen.get_mut(entry.index as usize).ok_or_else(|| {
                Error::malformed(format!(
                    "index {} is outside 0..{count}",
                    entry.index
                ))
            })?;
            if *slot {
                return Err(Error::malformed(format!(
                    "index {} appears more than once",
                    entry.index
                )));
            }
            *slot = true;
        }

        entries.sort_by_key(|entry| entry.index);
        Ok(Self::new(count, entries))
    }

    /// Entries sorted by index, without checking density
    pub(crate) fn sorted(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.index);
        entries
    }

    /// Look up an entry by its header index
    pub fn by_index(&self, index: u32) -> Option<&Entry> {
        self.entries
            .get(index as usize)
            .filter(|entry| entry.index == index)
            .or_else(|| self.entries.iter().find(|entry| entry.index == index))
    }
}
