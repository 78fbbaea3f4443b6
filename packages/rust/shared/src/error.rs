//! Error types for seenlist.
//!
//! Library crates use [`SeenlistError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all seenlist operations.
#[derive(Debug, thiserror::Error)]
pub enum SeenlistError {
    /// Configuration loading, validation, or missing credential.
    #[error("config error: {message}")]
    Config { message: String },

    /// Connectivity failure talking to a remote host.
    #[error("transport error: {0}")]
    Transport(String),

    /// A remote answered with a non-success status.
    #[error("{operation} returned HTTP {status}")]
    Upstream { operation: String, status: u16 },

    /// A title search produced no usable result.
    #[error("no results found for '{title}' ({reason})")]
    NotFound { title: String, reason: String },

    /// Malformed response payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (bad URL, empty data, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SeenlistError>;

impl SeenlistError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error for a title.
    pub fn not_found(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
            reason: reason.into(),
        }
    }

    /// Create an upstream error for a named remote operation.
    pub fn upstream(operation: impl Into<String>, status: u16) -> Self {
        Self::Upstream {
            operation: operation.into(),
            status,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only affects a single title and must not abort a run.
    pub fn is_per_title(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Upstream { .. } | Self::NotFound { .. } | Self::Decode(_)
        )
    }
}
