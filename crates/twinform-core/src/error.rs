//! Error types for serialization and deserialization.

use thiserror::Error;

/// Errors that can occur while converting between typed values and text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The text handed to a deserializer was empty or whitespace-only.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The text does not follow the codec's grammar, or nests deeper than
    /// [`MAX_DEPTH`](crate::value::MAX_DEPTH) containers.
    /// `line` is 1-based for the indentation codec. The bracketed codec
    /// reports line 0 and names the byte offset in `message`.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// The parsed value's shape cannot be bound onto the requested type.
    #[error("cannot convert {found} into {expected}")]
    UnsupportedConversion {
        expected: &'static str,
        found: String,
    },

    /// The bracketed codec reached a shared node that is already being serialized.
    #[error("reference cycle detected while serializing")]
    CyclicGraph,
}

impl Error {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Error::Format {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(expected: &'static str, found: impl Into<String>) -> Self {
        Error::UnsupportedConversion {
            expected,
            found: found.into(),
        }
    }
}

/// Convenience alias used throughout twinform-core.
pub type Result<T> = std::result::Result<T, Error>;
