//! Error types for token arithmetic and backup path handling.
use thiserror::Error;

/// Top-level error type for placement computations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid remote key '{key}': {reason}")]
    InvalidFormat { key: String, reason: String },
}

impl PlacementError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_format(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
