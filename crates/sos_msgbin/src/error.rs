//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    UTF8Error(#[from] std::string::FromUtf8Error),

    /// Transparent wrapper for [`quick_xml::Error`]
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),

    /// Transparent wrapper for [`serde_json::Error`]
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Input bytes or document do not describe a valid string table
    #[error("malformed input: {0}")]
    #[diagnostic(help("the file may be truncated or not a message bin string table"))]
    MalformedInput(String),

    /// In-memory table cannot be encoded
    #[error("invalid table: {0}")]
    InvalidTable(String),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedInput(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidTable(message.into())
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
