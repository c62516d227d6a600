//! Plain HTTP fetcher with browser-like headers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

const PRIMARY_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ALTERNATE_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP fetcher presenting itself as a desktop browser.
///
/// Some sites refuse requests that look automated; when a fetch comes back
/// blocked (403 or an "access denied" body), one retry is made with a
/// different identifying header before giving up.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with default browser-like headers and a 15s timeout.
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(PRIMARY_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        Self {
            client: Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to create HTTP client"),
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Whether a response looks like a bot-detection block.
    fn is_blocked(status: u16, body: &str) -> bool {
        status == 403 || body.to_lowercase().contains("access denied")
    }

    async fn fetch_with_agent(&self, url: &str, user_agent: Option<&str>) -> CrawlResult<FetchedPage> {
        let mut builder = self.client.get(url).timeout(self.timeout);
        if let Some(agent) = user_agent {
            builder = builder.header(USER_AGENT, agent);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::Timeout { url: url.to_string() }
            } else {
                CrawlError::Http(Box::new(e))
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .text()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(FetchedPage {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> CrawlResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");
        let page = self.fetch_with_agent(url, None).await?;

        if Self::is_blocked(page.status, &page.body) {
            warn!(url = %url, status = page.status, "Fetch blocked, retrying with alternate agent");
            return self.fetch_with_agent(url, Some(ALTERNATE_USER_AGENT)).await;
        }

        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_detection() {
        assert!(HttpFetcher::is_blocked(403, ""));
        assert!(HttpFetcher::is_blocked(200, "<h1>Access Denied</h1>"));
        assert!(!HttpFetcher::is_blocked(200, "<h1>Pricing</h1>"));
        assert!(!HttpFetcher::is_blocked(404, "not found"));
    }
}
