//! Trend aggregation error types.

use thiserror::Error;

/// Errors raised inside the article fetcher.
///
/// These never leave [`crate::QiitaClient`]'s public fetch methods, which
/// log them and return an empty batch instead.
#[derive(Debug, Error)]
pub enum TrendsError {
    /// Transport failure or timeout
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
