//! Error types for format and conversion operations

use thiserror::Error;

/// Errors that can occur while parsing, rendering or writing documents
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// A caller-supplied argument was rejected before any document was touched
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A directive is missing an attribute it cannot be rendered without
    #[error("Directive '{directive}' is missing required attribute '{attribute}'")]
    MissingAttribute { directive: String, attribute: String },
    /// Filesystem failure while reading inputs or writing outputs
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io(err.to_string())
    }
}
