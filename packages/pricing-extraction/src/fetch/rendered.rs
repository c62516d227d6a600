//! Rendering-service fetcher for JavaScript-heavy sites.
//!
//! Talks to a browserless-style HTTP API that loads the page in a headless
//! browser, executes scripts, optionally clicks pricing-revealing elements,
//! and returns the rendered HTML. The service keeps browser sessions warm,
//! so `close()` is a real teardown step here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Fetcher backed by a rendering service.
///
/// # Example
///
/// ```rust,ignore
/// use pricing_extraction::fetch::RenderedFetcher;
///
/// let fetcher = RenderedFetcher::new("http://localhost:3000", None);
/// let page = fetcher.fetch_page("https://example.com/pricing").await?;
/// fetcher.close().await;
/// ```
pub struct RenderedFetcher {
    client: Client,
    base_url: String,
    token: Option<String>,
    /// Selectors the browser clicks before extraction, to reveal pricing UI
    reveal_selectors: Vec<String>,
    closed: AtomicBool,
}

#[derive(Serialize)]
struct RenderRequest {
    url: String,
    #[serde(rename = "gotoOptions")]
    goto_options: GotoOptions,
    #[serde(rename = "rejectResourceTypes")]
    reject_resource_types: Vec<String>,
    #[serde(rename = "bestAttempt")]
    best_attempt: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    elements: Vec<ClickElement>,
}

#[derive(Serialize)]
struct GotoOptions {
    #[serde(rename = "waitUntil")]
    wait_until: String,
    timeout: u64,
}

#[derive(Serialize)]
struct ClickElement {
    selector: String,
}

impl RenderedFetcher {
    /// Create a fetcher against the given service base URL.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(90))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            token,
            reveal_selectors: [
                "[class*='pricing-toggle']",
                "[class*='show-pricing']",
                "button[class*='price']",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            closed: AtomicBool::new(false),
        }
    }

    /// Replace the selectors clicked to reveal pricing UI.
    pub fn with_reveal_selectors(
        mut self,
        selectors: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.reveal_selectors = selectors.into_iter().map(|s| s.into()).collect();
        self
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch_page(&self, url: &str) -> CrawlResult<FetchedPage> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CrawlError::Closed);
        }

        debug!(url = %url, "Rendered fetch starting");

        let request = RenderRequest {
            url: url.to_string(),
            goto_options: GotoOptions {
                wait_until: "networkidle2".to_string(),
                timeout: 60_000,
            },
            reject_resource_types: ["image", "font", "media"]
                .into_iter()
                .map(String::from)
                .collect(),
            best_attempt: true,
            elements: self
                .reveal_selectors
                .iter()
                .map(|s| ClickElement {
                    selector: s.clone(),
                })
                .collect(),
        };

        let mut endpoint = format!("{}/content", self.base_url.trim_end_matches('/'));
        if let Some(token) = &self.token {
            endpoint = format!("{}?token={}", endpoint, token);
        }

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CrawlError::Timeout { url: url.to_string() }
                } else {
                    CrawlError::Http(Box::new(e))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        if !(200..300).contains(&status) {
            warn!(url = %url, status = status, "Rendering service returned non-success");
        }

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            content_type: Some("text/html".to_string()),
            body,
        })
    }

    fn name(&self) -> &str {
        "rendered"
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!("Rendered fetcher closed");
    }
}
