//! Error types for the veleta framework.
//!
//! This module defines the error taxonomy shared across the veleta crates.
//! Configuration problems fail fast before any data is touched; malformed
//! input fails with a descriptive validation error. Degenerate data (empty
//! frames, zero variance, all-NaN rows) is never an error and flows through
//! as empty results or NaN sentinels.

use thiserror::Error;

/// The main error type for veleta operations.
#[derive(Debug, Error)]
pub enum VeletaError {
    /// A configuration value is invalid. Raised at construction time,
    /// before any data enters the pipeline.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input data is malformed (wrong shape, non-finite signals,
    /// missing required inputs).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Matrix dimensions do not agree with the index/column labels.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The time index contains a repeated timestamp.
    #[error("Duplicate timestamp in index: {0}")]
    DuplicateTimestamp(String),

    /// Two columns share the same asset identifier.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for VeletaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for VeletaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for veleta operations.
pub type Result<T> = std::result::Result<T, VeletaError>;
