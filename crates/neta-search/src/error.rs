//! Search adapter error types.

use thiserror::Error;

/// Errors raised by a search backend.
///
/// [`crate::WebSearch`] converts these into error records; they never
/// reach its callers as `Err`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport failure or timeout. The request URL is stripped since
    /// Google carries its API key in the query string.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend quota or rate limit exhausted
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// Credentials missing
    #[error("{0} not configured")]
    NotConfigured(String),

    /// Response body was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Http(e.without_url())
    }
}

impl SearchError {
    /// True for quota exhaustion, including errors whose message only
    /// mentions a quota or rate limit.
    pub fn is_quota(&self) -> bool {
        matches!(self, SearchError::Quota(_)) || is_quota_message(&self.to_string())
    }
}

/// Whether an error message describes a quota or rate limit.
pub fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["quota", "rate limit", "ratelimit", "limit exceeded", "resource_exhausted"]
        .iter()
        .any(|needle| lower.contains(needle))
}
