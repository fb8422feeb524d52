//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations must implement.
//! The trait provides a uniform interface for reading and writing documents as bytes.

use crate::error::FormatError;
use crate::ir::{docx, markdown};

/// A parsed document in one of the two object models.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Docx(docx::Document),
    Markdown(markdown::Document),
}

impl Document {
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Docx(_) => "docx",
            Document::Markdown(_) => "markdown",
        }
    }
}

/// Serialized output produced by a [`Format`] implementation.
pub enum SerializedDocument {
    /// UTF-8 text output (Markdown)
    Text(String),
    /// Binary output (DOCX packages)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }
}

/// Trait for document formats
///
/// Implementors convert between raw file bytes and one of the document object models.
/// Formats can support parsing, serialization, or both. Converting between the two
/// models is not a format concern; see [`crate::render`].
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "docx", "markdown")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    ///
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (bytes → Document)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Document → bytes)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse file contents into a Document
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &[u8]) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a Document into file contents
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _doc: &Document) -> Result<SerializedDocument, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}
