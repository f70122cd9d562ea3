//! Error types for loading message records

use std::io;
use thiserror::Error;

/// Errors that can occur while reading message files
#[derive(Debug, Error)]
pub enum MessageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON input
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed CSV input
    #[error("Invalid CSV at record {record}: {message}")]
    Csv { record: usize, message: String },
}

impl From<csv::Error> for MessageError {
    fn from(err: csv::Error) -> Self {
        let record = err
            .position()
            .map_or(0, |p| usize::try_from(p.record()).unwrap_or(usize::MAX));
        Self::Csv {
            record,
            message: err.to_string(),
        }
    }
}
