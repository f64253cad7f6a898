//! Error types for the board and its persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing the board document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode board: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("board document is malformed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("no board document at {0}")]
    Missing(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures resolving a user-supplied task identifier.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no task found matching '{0}'")]
    NotFound(String),

    #[error("'{}' matches several tasks:\n  {}\nPlease use the task ID instead.", .identifier, .candidates.join("\n  "))]
    Ambiguous {
        identifier: String,
        candidates: Vec<String>,
    },
}
