//! Testing utilities including mock implementations.
//!
//! These make it possible to exercise the pipeline without network access or
//! real model calls. Mocks are `Clone`; clones share state, so a test can
//! keep a handle for assertions after moving a clone into the pipeline.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::discovery::existence::ExistenceCheck;
use crate::error::{CrawlError, CrawlResult, ExtractionError, Result};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::model::LanguageModel;

/// A mock language model that replays scripted responses in order.
///
/// Each `complete` call pops the next scripted entry; an exhausted script
/// fails the call, which exercises the same path as a provider outage.
#[derive(Default, Clone)]
pub struct MockLanguageModel {
    responses: Arc<RwLock<VecDeque<std::result::Result<String, String>>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockLanguageModel {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a call failure.
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(Err(reason.into()));
        self
    }

    /// Prompts received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.write().unwrap().push(prompt.to_string());

        match self.responses.write().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(ExtractionError::Model(reason.into())),
            None => Err(ExtractionError::Model("no scripted response".into())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock page fetcher serving predefined pages.
///
/// Unknown URLs error like an unreachable host; URLs marked with `fail_url`
/// error like a refused connection.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    fail_urls: Arc<RwLock<HashSet<String>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined page, keyed by its URL.
    pub fn with_page(self, page: FetchedPage) -> Self {
        self.pages.write().unwrap().insert(page.url.clone(), page);
        self
    }

    /// Add multiple predefined pages.
    pub fn with_pages(self, pages: impl IntoIterator<Item = FetchedPage>) -> Self {
        {
            let mut store = self.pages.write().unwrap();
            for page in pages {
                store.insert(page.url.clone(), page);
            }
        }
        self
    }

    /// Mark a URL as failing at the transport level.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().insert(url.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str) -> CrawlResult<FetchedPage> {
        self.fetched.write().unwrap().push(url.to_string());

        if self.fail_urls.read().unwrap().contains(url) {
            return Err(CrawlError::Http("mock connection refused".into()));
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CrawlError::InvalidUrl { url: url.to_string() })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock existence checker with a fixed set of live URLs.
#[derive(Default, Clone)]
pub struct MockExistence {
    live: Arc<RwLock<HashSet<String>>>,
    checked: Arc<RwLock<Vec<String>>>,
}

impl MockExistence {
    /// Create a checker where nothing is live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checker with the given live URLs.
    pub fn with_live<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::default();
        {
            let mut live = mock.live.write().unwrap();
            for url in urls {
                live.insert(url.into());
            }
        }
        mock
    }

    /// Mark an additional URL as live.
    pub fn add_live(&self, url: impl Into<String>) {
        self.live.write().unwrap().insert(url.into());
    }

    /// URLs checked so far, in order.
    pub fn checked_urls(&self) -> Vec<String> {
        self.checked.read().unwrap().clone()
    }
}

#[async_trait]
impl ExistenceCheck for MockExistence {
    async fn exists(&self, url: &str) -> bool {
        self.checked.write().unwrap().push(url.to_string());
        self.live.read().unwrap().contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_replays_in_order() {
        let model = MockLanguageModel::new()
            .with_response("first")
            .with_failure("down")
            .with_response("third");

        assert_eq!(model.complete("a").await.unwrap(), "first");
        assert!(model.complete("b").await.is_err());
        assert_eq!(model.complete("c").await.unwrap(), "third");
        // Script exhausted
        assert!(model.complete("d").await.is_err());

        assert_eq!(model.calls(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_mock_fetcher_serves_pages() {
        let fetcher = MockFetcher::new()
            .with_page(FetchedPage::ok("https://example.com", "home"))
            .fail_url("https://down.example.com");

        let page = fetcher.fetch_page("https://example.com").await.unwrap();
        assert_eq!(page.body, "home");

        assert!(fetcher.fetch_page("https://down.example.com").await.is_err());
        assert!(fetcher.fetch_page("https://unknown.example.com").await.is_err());

        assert_eq!(fetcher.fetched_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_existence() {
        let existence = MockExistence::with_live(["https://example.com"]);
        assert!(existence.exists("https://example.com").await);
        assert!(!existence.exists("https://example.com/missing").await);
        assert_eq!(existence.checked_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let model = MockLanguageModel::new().with_response("hi");
        let handle = model.clone();

        model.complete("prompt").await.unwrap();
        assert_eq!(handle.calls(), vec!["prompt"]);
    }
}
