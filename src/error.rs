// src/error.rs
//! Error kinds surfaced by the scoring engine and ingestion.

use thiserror::Error;

/// Rejected input. The dataset is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("CSV must contain 'name', 'last_contact', and 'emails' columns (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Parameter 'by' must be either 'engagement' or 'sentiment'.")]
    UnknownMetric(String),

    #[error("Parameter 'n' must be an integer.")]
    InvalidCount(String),

    #[error("Failed to process file: {0}")]
    MalformedUpload(String),

    #[error("No file part")]
    MissingFilePart,

    #[error("No selected file")]
    EmptyFilename,
}

/// A stored `last_contact` that is not a `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row} ({name}): invalid last_contact '{value}': {source}")]
pub struct ParseError {
    pub row: usize,
    pub name: String,
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}
