//! Error types for tagspan-core.

use thiserror::Error;

/// Result type for tagspan-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tagspan-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Span bounds are invalid (start >= end).
    #[error("Invalid span [{start}, {end}): start must be less than end")]
    InvalidSpan {
        /// Start offset of the rejected span.
        start: usize,
        /// End offset of the rejected span.
        end: usize,
    },

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
