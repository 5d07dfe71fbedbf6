//! Staging store errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to prepare staging directory {path}: {source}")]
    PrepareDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stage file '{name}': {source}")]
    Copy {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to remove staged path {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file name '{0}' is not allowed in staging")]
    InvalidName(String),
}
