//! Error types for the price API client.

use thiserror::Error;

/// Errors that can occur when talking to the price API.
#[derive(Debug, Error)]
pub enum PricesError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("Price API error: {0}")]
    Api(String),

    /// A record carried a timestamp the client could not parse.
    #[error("Invalid timestamp in response: {0}")]
    InvalidTimestamp(String),

    /// The query named an empty symbol list.
    #[error("Symbol list must not be empty")]
    NoSymbols,

    /// Response data could not be assembled into a frame.
    #[error(transparent)]
    Frame(#[from] veleta_core::VeletaError),
}
