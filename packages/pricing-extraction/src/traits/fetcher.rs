//! Page-fetch capability.
//!
//! Two implementations exist: a plain HTTP fetcher and a rendering-service
//! fetcher that executes page scripts first. Both satisfy the same contract
//! (URL in, status + body out), so the orchestrator is written once and the
//! strategy is selected by configuration.

use async_trait::async_trait;

use crate::error::CrawlResult;

/// A fetched page: final URL after redirects, HTTP status, and raw body.
///
/// A non-success status is a normal `Ok` value here; transport failures are
/// the error path. Callers decide what a non-200 means for them (the link
/// collector reports zero links, the content extractor reports an error).
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value if the server sent one
    pub content_type: Option<String>,

    /// Raw response body (usually HTML)
    pub body: String,
}

impl FetchedPage {
    /// Create a page with a 200 status.
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            content_type: None,
            body: body.into(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the status indicates success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch capability for retrieving page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single URL, following redirects.
    async fn fetch_page(&self, url: &str) -> CrawlResult<FetchedPage>;

    /// Strategy name for logging.
    fn name(&self) -> &str {
        "unknown"
    }

    /// Release any held resources (rendering sessions, connections).
    ///
    /// Called once when the run ends; fetching after close is an error for
    /// implementations that hold real resources.
    async fn close(&self) {}
}
