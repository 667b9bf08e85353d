//! # Message Bin Format Documentation
//!
//! This crate provides utilities to read, create and convert the **message bin** string table
//! format. A message bin stores an ordered list of UTF-16 strings addressed by their position
//! in a table of byte offsets. Message bins are typically identified with the `.bin` extension.
//!
//! ## File Structure
//!
//! A message bin consists of an offset header followed by a blob of strings.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Offset Header          | (Count * 4) bytes: byte offset of each string              |
//! | Count * 4      | String Blob            | Strings back to back, each followed by a terminator        |
//!
//! ### Header
//!
//! The header is `Count` consecutive 4-byte unsigned integers. There is no explicit count field:
//! the first string immediately follows the header, so the first offset is also the header
//! length and `Count = offsets[0] / 4`.
//!
//! An empty table is stored as a single zero offset.
//!
//! ### String Blob
//!
//! Each string has the following structure:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Data                   | (Characters * 2) bytes: UTF-16 string                   |
//! | Characters * 2 | Terminator             | 2 bytes: 0x0000                                         |
//!
//! A string ends where the next string starts, or at the end of the file for the last one. The
//! terminator is located by position and never scanned for, so a string holding an embedded
//! null unit is still read to its full length, and bytes appended after the last string become
//! part of it.
//!
//! ## Document Forms
//!
//! Tables convert to and from an editable document with a root declaring `Count` and one child
//! per string declaring its `Index`; see [`xml`] and, with the `serde` feature, [`json`].
//!
//! ## Additional Information
//!
//! - **File Extension**: `.bin`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
#[cfg(feature = "serde")]
pub mod json;
pub mod read;
pub mod types;
pub mod write;
pub mod xml;

pub use read::{decode, StringTableReader};
pub use types::{Entry, Table};
pub use write::{encode, StringTableWriter};
