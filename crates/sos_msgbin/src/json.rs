//! JSON document form of a string table
//!
//! ```json
//! {
//!   "Count": 2,
//!   "Entries": [
//!     { "Index": 0, "Text": "Hello" },
//!     { "Index": 1, "Text": "World" }
//!   ]
//! }
//! ```

use serde::{
    ser::{SerializeSeq, SerializeStruct},
    Deserialize, Serialize, Serializer,
};
use tracing::instrument;

use crate::error::Result;
use crate::types::{Entry, Table};

struct EntryRef<'a>(&'a Entry);

impl Serialize for EntryRef<'_> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entry = serializer.serialize_struct("Entry", 2)?;
        entry.serialize_field("Index", &self.0.index())?;
        entry.serialize_field("Text", &self.0.document_text())?;
        entry.end()
    }
}

struct EntriesRef<'a>(&'a Table);

impl Serialize for EntriesRef<'_> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sorted = self.0.sorted();
        let mut seq = serializer.serialize_seq(Some(sorted.len()))?;
        for entry in sorted {
            seq.serialize_element(&EntryRef(entry))?;
        }
        seq.end()
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut table = serializer.serialize_struct("Entries", 2)?;
        table.serialize_field("Count", &self.count())?;
        table.serialize_field("Entries", &EntriesRef(self))?;
        table.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct DocumentEntry {
    index: u32,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct Document {
    count: u32,
    #[serde(default)]
    entries: Vec<DocumentEntry>,
}

impl Document {
    fn into_table(self) -> Result<Table> {
        let entries = self
            .entries
            .into_iter()
            .map(|entry| Entry::from_text(entry.index, entry.text))
            .collect();

        Table::from_document(self.count, entries)
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Document::deserialize(deserializer)?
            .into_table()
            .map_err(serde::de::Error::custom)
    }
}

/// Render `table` as pretty-printed JSON, entries in index order
#[instrument(skip_all, fields(count = table.count()), err)]
pub fn to_json(table: &Table) -> Result<String> {
    let mut json = serde_json::to_string_pretty(table)?;
    json.push('\n');

    Ok(json)
}

/// Parse a table from a JSON document.
///
/// Shape errors surface as [`crate::error::Error::JsonError`]; count and index
/// violations as [`crate::error::Error::MalformedInput`].
#[instrument(skip_all, fields(len = json.len()), err)]
pub fn from_json(json: &str) -> Result<Table> {
    serde_json::from_str::<Document>(json)?.into_table()
}
