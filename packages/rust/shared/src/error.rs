//! Error types for Draftmill.
//!
//! Library crates use [`DraftmillError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics and maps
//! each category to a distinct process exit code.

use std::path::PathBuf;

/// Top-level error type for all Draftmill operations.
#[derive(Debug, thiserror::Error)]
pub enum DraftmillError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Catalog loading or validation error (malformed, empty, duplicate id).
    #[error("catalog error: {message}")]
    Catalog { message: String },

    /// Topic selection error (only possible on an empty catalog).
    #[error("selection error: {message}")]
    Selection { message: String },

    /// Draft artifact could not be written to disk.
    #[error("write error: {message}")]
    Write { message: String },

    /// Selection state could not be persisted or read back.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// External body generation failed (always recovered by the assembler).
    #[error("generation error: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DraftmillError>;

impl DraftmillError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a catalog error from any displayable message.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog {
            message: msg.into(),
        }
    }

    /// Create a selection error from any displayable message.
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::Selection {
            message: msg.into(),
        }
    }

    /// Create an artifact write error from any displayable message.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DraftmillError::catalog("duplicate topic id 'a'");
        assert_eq!(err.to_string(), "catalog error: duplicate topic id 'a'");

        let err = DraftmillError::write("drafts dir is not writable");
        assert!(err.to_string().contains("not writable"));
    }
}
