use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a marketplace tree.
#[derive(Error, Debug)]
pub enum MarketcheckError {
    /// A required file could not be read.
    #[error("file is missing: {}", path.display())]
    Missing { path: PathBuf },

    /// A manifest was read but is not valid JSON.
    #[error("invalid JSON ({}): {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, MarketcheckError>`.
pub type Result<T> = std::result::Result<T, MarketcheckError>;
