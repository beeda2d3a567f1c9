//! Error types for tagspan.

use thiserror::Error;

/// Result type for tagspan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tagspan operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from the core value types (invalid span, bad raw record).
    #[error(transparent)]
    Core(#[from] tagspan_core::Error),

    /// Annotation does not start and end on token boundaries.
    #[error("Span [{start}, {end}) does not align to token boundaries")]
    Misaligned {
        /// Start offset of the rejected span.
        start: usize,
        /// End offset of the rejected span.
        end: usize,
    },

    /// Label is not part of the session's label set.
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// Operation would discard unsaved edits.
    #[error("Unsaved annotations would be lost")]
    UnsavedChanges,

    /// A load or save is still outstanding.
    #[error("Session is busy with a pending {0}")]
    Busy(&'static str),

    /// No document is loaded.
    #[error("No document loaded")]
    NotLoaded,

    /// The active user may not modify this view.
    #[error("Read-only view: {0}")]
    ReadOnly(String),

    /// Persistence collaborator failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a misalignment error for a span.
    #[must_use]
    pub fn misaligned(span: tagspan_core::Span) -> Self {
        Error::Misaligned {
            start: span.start,
            end: span.end,
        }
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a read-only error.
    pub fn read_only(msg: impl Into<String>) -> Self {
        Error::ReadOnly(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::Core(tagspan_core::Error::invalid_input(msg))
    }
}
