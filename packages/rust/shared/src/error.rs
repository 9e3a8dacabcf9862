//! Error types for articleflow.
//!
//! Library crates use [`ArticleflowError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all articleflow operations.
#[derive(Debug, thiserror::Error)]
pub enum ArticleflowError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to a provider or the item store.
    #[error("network error: {0}")]
    Network(String),

    /// Response body or HTML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Item store error (REST backend, missing rows, read-only writes).
    #[error("storage error: {0}")]
    Storage(String),

    /// Local libSQL database error.
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),

    /// Text-generation provider error. Halts the item for the current run.
    #[error("rewrite error: {0}")]
    Rewrite(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (broken invariant, invalid input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArticleflowError>;

impl ArticleflowError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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
