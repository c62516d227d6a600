//! Two-tier URL liveness checking.
//!
//! Some servers reject HEAD but accept GET, and GET is the more expensive of
//! the two, so the cheap probe goes first: HEAD with redirects and a short
//! timeout, then GET only if HEAD did not report success. Failure of both
//! tiers means "not live". No retries beyond the two tiers.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{CrawlError, CrawlResult};

/// Liveness verdict capability.
///
/// Injected into the link collector, sitemap engine, and ranker so tests can
/// fake liveness without network access.
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// Whether the URL answers with a success status.
    async fn exists(&self, url: &str) -> bool;
}

/// Transport seam beneath the existence checker.
///
/// Returns the response status for each probe type; transport failures are
/// the error path and count as "this tier failed, continue".
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Issue a HEAD request, following redirects.
    async fn head(&self, url: &str) -> CrawlResult<u16>;

    /// Issue a GET request, following redirects.
    async fn get(&self, url: &str) -> CrawlResult<u16>;
}

/// reqwest-backed probe transport with an 8s per-request timeout.
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe {
    /// Create a probe transport with its own redirect-following client.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(8))
                .build()
                .expect("Failed to create HTTP client"),
            timeout: Duration::from_secs(8),
        }
    }

    /// Create a probe transport sharing an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(8),
        }
    }
}

#[async_trait]
impl ProbeTransport for HttpProbe {
    async fn head(&self, url: &str) -> CrawlResult<u16> {
        let response = self
            .client
            .head(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;
        Ok(response.status().as_u16())
    }

    async fn get(&self, url: &str) -> CrawlResult<u16> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;
        Ok(response.status().as_u16())
    }
}

/// Two-tier existence checker over a probe transport.
pub struct ExistenceChecker<T: ProbeTransport = HttpProbe> {
    transport: T,
}

impl ExistenceChecker<HttpProbe> {
    /// Create a checker with the default HTTP transport.
    pub fn new() -> Self {
        Self {
            transport: HttpProbe::new(),
        }
    }
}

impl Default for ExistenceChecker<HttpProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ProbeTransport> ExistenceChecker<T> {
    /// Create a checker over a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: ProbeTransport> ExistenceCheck for ExistenceChecker<T> {
    async fn exists(&self, url: &str) -> bool {
        match self.transport.head(url).await {
            Ok(status) if status == 200 => return true,
            Ok(status) => debug!(url = %url, status = status, "HEAD probe not conclusive"),
            Err(e) => debug!(url = %url, error = %e, "HEAD probe failed"),
        }

        match self.transport.get(url).await {
            Ok(status) => status == 200,
            Err(e) => {
                debug!(url = %url, error = %e, "GET probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe {
        head_status: CrawlResult<u16>,
        get_status: CrawlResult<u16>,
        head_calls: AtomicUsize,
        get_calls: AtomicUsize,
    }

    impl CountingProbe {
        fn new(head_status: CrawlResult<u16>, get_status: CrawlResult<u16>) -> Self {
            Self {
                head_status,
                get_status,
                head_calls: AtomicUsize::new(0),
                get_calls: AtomicUsize::new(0),
            }
        }
    }

    fn clone_result(r: &CrawlResult<u16>) -> CrawlResult<u16> {
        match r {
            Ok(status) => Ok(*status),
            Err(_) => Err(CrawlError::Http("probe failure".into())),
        }
    }

    #[async_trait]
    impl ProbeTransport for CountingProbe {
        async fn head(&self, _url: &str) -> CrawlResult<u16> {
            self.head_calls.fetch_add(1, Ordering::SeqCst);
            clone_result(&self.head_status)
        }

        async fn get(&self, _url: &str) -> CrawlResult<u16> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            clone_result(&self.get_status)
        }
    }

    #[tokio::test]
    async fn test_head_success_skips_get() {
        let checker = ExistenceChecker::with_transport(CountingProbe::new(Ok(200), Ok(200)));
        assert!(checker.exists("https://example.com").await);
        assert_eq!(checker.transport.head_calls.load(Ordering::SeqCst), 1);
        assert_eq!(checker.transport.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_head_failure_falls_through_to_get() {
        let checker = ExistenceChecker::with_transport(CountingProbe::new(
            Err(CrawlError::Http("refused".into())),
            Ok(200),
        ));
        assert!(checker.exists("https://example.com").await);
        assert_eq!(checker.transport.head_calls.load(Ordering::SeqCst), 1);
        assert_eq!(checker.transport.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_head_non_200_falls_through_to_get() {
        let checker = ExistenceChecker::with_transport(CountingProbe::new(Ok(405), Ok(200)));
        assert!(checker.exists("https://example.com").await);
        assert_eq!(checker.transport.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_tiers_fail() {
        let checker = ExistenceChecker::with_transport(CountingProbe::new(
            Err(CrawlError::Http("refused".into())),
            Err(CrawlError::Http("refused".into())),
        ));
        assert!(!checker.exists("https://example.com").await);
    }

    #[tokio::test]
    async fn test_get_non_200_is_not_live() {
        let checker = ExistenceChecker::with_transport(CountingProbe::new(Ok(404), Ok(404)));
        assert!(!checker.exists("https://example.com").await);
    }
}
