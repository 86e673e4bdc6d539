//! Error types for ExecScout.
//!
//! Library crates use [`ExecScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Most failures inside a company run are soft: the orchestrator and the
//! pipeline turn them into [`ProcessingWarning`](crate::ProcessingWarning)s
//! instead of returning them.

use std::path::PathBuf;

/// Top-level error type for all ExecScout operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Markup or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A single extraction strategy failed on one document.
    #[error("strategy {strategy} failed: {message}")]
    Strategy { strategy: String, message: String },

    /// The per-company processing budget ran out.
    #[error("company processing timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// Discovery cache read/write error.
    #[error("cache error: {0}")]
    Cache(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad manifest, empty company name, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ExecScoutError>;

impl ExecScoutError {
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

    /// Create a strategy failure tagged with the strategy's name.
    pub fn strategy(strategy: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Strategy {
            strategy: strategy.into(),
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
