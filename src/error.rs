//! Error types for Engagement Flux

use thiserror::Error;

/// Errors that can occur while extracting, assembling or comparing datasets
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected document structure: expected {expected}")]
    Structure { expected: &'static str },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No usable data: {0}")]
    NoUsableData(String),
}

impl ComputeError {
    pub(crate) fn structure(expected: &'static str) -> Self {
        ComputeError::Structure { expected }
    }
}
