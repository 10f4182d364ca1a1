//! Error types for the earnings query orchestrator

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {

    // =============================
    // Pipeline Errors
    // =============================

    /// Classifier output was malformed or named an unknown category.
    #[error("Classification error: {0}")]
    Classification(String),

    /// A single evidence source failed or came back empty.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Every source behind a category strategy failed.
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl QueryError {
    /// Fatal errors abort the request; everything else degrades to
    /// missing evidence.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            QueryError::DataUnavailable(_) | QueryError::Aggregation(_)
        )
    }
}
