//! Typed errors for the crawler library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during crawl operations.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed (connection error, or non-2xx response)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx response from the target site
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Connection timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Operation was cancelled by a stop request
    #[error("crawl cancelled")]
    Cancelled,

    /// Session id not present in the registry
    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },
}

impl CrawlError {
    /// Whether this error came from a stop request rather than a site failure.
    ///
    /// Cancellation is control flow, not a per-URL failure: it must never be
    /// retried and never lands in the accumulated error list.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CrawlError::Cancelled)
    }
}

/// Errors that can occur in the persistence gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Underlying storage failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Record not found
    #[error("record not found: {id}")]
    NotFound { id: String },
}

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
