//! Error types for the analyzer framework.

use thiserror::Error;

use crate::sources::ExecutorError;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur during analyzer operations.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A table or column name failed validation before any query was issued.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A required query against the database failed.
    #[error("query execution failed: {0}")]
    Query(#[from] ExecutorError),

    /// The target table or column holds no data to analyze.
    #[error("no data available")]
    NoData,

    /// A query returned data in an unusable shape.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Generic analyzer error with custom message.
    #[error("{0}")]
    Custom(String),
}

impl AnalyzerError {
    /// Creates an invalid identifier error for the given name.
    pub fn invalid_identifier(name: impl Into<String>) -> Self {
        Self::InvalidIdentifier(name.into())
    }

    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates a custom error with the given message.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Converts serde_json errors to AnalyzerError.
impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
