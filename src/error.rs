//! Error types shared by the schema and compute modules.

use thiserror::Error;

use crate::schema::SearchResult;

/// Errors produced while configuring or running a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid domain: lower bound {lower} must be finite and below upper bound {upper}")]
    InvalidDomain { lower: f64, upper: f64 },

    #[error("Index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Dimension mismatch in {field}: expected {expected}, got {actual}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Objective evaluation failed at {point:?}: {reason}")]
    EvaluatorFailure { point: Vec<f64>, reason: String },

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// A run that stopped on an error, with the best point found before it.
#[derive(Debug, Error)]
#[error("Search failed: {error}")]
pub struct RunFailure {
    #[source]
    pub error: SearchError,
    /// Result as of the failure (termination reason `Failed`).
    pub partial: SearchResult,
}
