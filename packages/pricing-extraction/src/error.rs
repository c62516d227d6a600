//! Typed errors for the pricing extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during extraction operations.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Crawl or fetch operation failed
    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// Language model call failed
    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Model returned text that could not be parsed
    #[error("model response error: {0}")]
    ModelResponse(#[from] ResponseParseError),

    /// Extracted content too short or error-tagged
    #[error("unusable content from {url}: {reason}")]
    UnusableContent { url: String, reason: String },

    /// Checkpoint file could not be read or written
    #[error("checkpoint error: {0}")]
    Checkpoint(#[source] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Per-site wall-clock timeout elapsed
    #[error("site processing timed out after {secs}s")]
    SiteTimeout { secs: u64 },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors that can occur while fetching pages.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP transport failure (connect, TLS, timeout at the socket level)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Fetcher was used after `close()`
    #[error("fetcher closed")]
    Closed,
}

/// Errors from parsing a model's free-text response into JSON.
///
/// The contract is strict: locate the first balanced brace-delimited span,
/// attempt a strict JSON decode, and surface a typed error otherwise. An
/// excerpt of the raw response is carried for diagnostics.
#[derive(Debug, Error)]
pub enum ResponseParseError {
    /// No balanced `{...}` span found in the response text
    #[error("no JSON object in model response (excerpt: {excerpt:?})")]
    NoJsonObject { excerpt: String },

    /// The located span was not valid JSON
    #[error("invalid JSON in model response: {source} (excerpt: {excerpt:?})")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for fetch operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;
