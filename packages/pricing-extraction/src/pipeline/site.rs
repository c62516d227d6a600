//! Per-site orchestration: discover, rank, try URLs in order.
//!
//! The flow is a straight line with early exits:
//! discovering -> ranking -> trying URLs -> done. First match wins: the
//! first candidate whose analysis yields a non-empty plan list ends the
//! search, and the remaining candidates are never fetched.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::discovery::existence::ExistenceCheck;
use crate::discovery::links::LinkCollector;
use crate::discovery::sitemap::SitemapCrawler;
use crate::pipeline::analyzer::PricingAnalyzer;
use crate::pipeline::content::ContentExtractor;
use crate::pipeline::ranker::PricingUrlRanker;
use crate::traits::fetcher::PageFetcher;
use crate::traits::model::LanguageModel;
use crate::types::config::{DiscoveryConfig, RankerConfig, SiteConfig};
use crate::types::pricing::PricingResult;

/// Everything needed to process one site end to end.
///
/// Capabilities are injected once and shared: discovery always runs over
/// plain HTTP, while content extraction uses whichever fetch strategy the
/// run was configured with. Both pipeline variants therefore share this one
/// orchestrator.
pub struct SitePipeline {
    discovery_fetcher: Arc<dyn PageFetcher>,
    content_fetcher: Arc<dyn PageFetcher>,
    existence: Arc<dyn ExistenceCheck>,
    model: Arc<dyn LanguageModel>,
    discovery_config: DiscoveryConfig,
    ranker_config: RankerConfig,
    site_config: SiteConfig,
}

impl SitePipeline {
    /// Create a pipeline with default configuration.
    pub fn new(
        discovery_fetcher: Arc<dyn PageFetcher>,
        content_fetcher: Arc<dyn PageFetcher>,
        existence: Arc<dyn ExistenceCheck>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            discovery_fetcher,
            content_fetcher,
            existence,
            model,
            discovery_config: DiscoveryConfig::default(),
            ranker_config: RankerConfig::default(),
            site_config: SiteConfig::default(),
        }
    }

    /// Set the discovery configuration.
    pub fn with_discovery_config(mut self, config: DiscoveryConfig) -> Self {
        self.discovery_config = config;
        self
    }

    /// Set the ranker configuration.
    pub fn with_ranker_config(mut self, config: RankerConfig) -> Self {
        self.ranker_config = config;
        self
    }

    /// Set the per-site configuration.
    pub fn with_site_config(mut self, config: SiteConfig) -> Self {
        self.site_config = config;
        self
    }

    /// Release fetcher resources at the end of a run.
    pub async fn close(&self) {
        self.discovery_fetcher.close().await;
        self.content_fetcher.close().await;
    }

    /// Process one site into a result. Never panics, never errors: every
    /// failure mode is folded into a failure `PricingResult`.
    pub async fn process(&self, name: &str, domain: &str) -> PricingResult {
        info!(name = %name, domain = %domain, "Processing site");

        // Discovering
        let candidates = self.discover(domain).await;
        info!(domain = %domain, candidates = candidates.len(), "Discovery finished");

        // Ranking
        let ranker = PricingUrlRanker::new(
            self.model.clone(),
            self.existence.clone(),
            self.ranker_config.clone(),
        );
        let mut pricing_urls = ranker.rank(domain, candidates).await;

        if pricing_urls.is_empty() {
            return PricingResult::failure(name, domain, "No pricing pages found");
        }

        if let Some(cap) = self.site_config.max_url_attempts {
            if pricing_urls.len() > cap {
                warn!(
                    domain = %domain,
                    total = pricing_urls.len(),
                    cap = cap,
                    "Too many pricing URLs, trying the first ones only"
                );
                pricing_urls.truncate(cap);
            }
        }

        // Trying URLs, in rank order
        let extractor = ContentExtractor::new(self.content_fetcher.clone(), self.site_config.clone());
        let analyzer = PricingAnalyzer::new(self.model.clone());

        for (attempt, url) in pricing_urls.iter().enumerate() {
            info!(
                domain = %domain,
                url = %url,
                attempt = attempt + 1,
                total = pricing_urls.len(),
                "Trying pricing URL"
            );

            let content = match extractor.extract(url).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(url = %url, error = %e, "Content extraction failed");
                    continue;
                }
            };

            if content.len() < self.site_config.min_content_length {
                warn!(url = %url, chars = content.len(), "Content too short to analyze");
                continue;
            }

            let analysis = match analyzer.analyze(&content, url).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!(url = %url, error = %e, "Pricing analysis failed");
                    continue;
                }
            };

            if analysis.has_plans() {
                info!(
                    name = %name,
                    url = %url,
                    plans = analysis.plans.len(),
                    "Pricing plans extracted"
                );
                return PricingResult::success(name, domain, url, analysis, content.len());
            }

            warn!(url = %url, "No pricing plans in analysis, trying next URL");
        }

        PricingResult::failure(name, domain, "All URLs failed to yield valid pricing data")
            .with_attempted_urls(pricing_urls)
    }

    /// Run link collection and sitemap traversal, unioned.
    async fn discover(&self, domain: &str) -> HashSet<String> {
        let collector = LinkCollector::new(
            self.discovery_fetcher.clone(),
            self.existence.clone(),
            self.discovery_config.clone(),
        );
        let sitemaps = SitemapCrawler::new(
            self.discovery_fetcher.clone(),
            self.existence.clone(),
            self.discovery_config.clone(),
        );

        let mut candidates = collector.collect(domain).await;
        candidates.extend(sitemaps.collect(domain).await);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExistence, MockFetcher, MockLanguageModel};
    use crate::traits::fetcher::FetchedPage;

    const PLANS_JSON: &str = r#"{"currency":"usd","plans":[{"name":"Pro","pricing_tiers":[{"price":9.0,"currency":"usd","billing_period":"monthly","features":["X"]}]}]}"#;
    const NO_PLANS_JSON: &str = r#"{"currency":"usd","plans":[]}"#;

    fn pipeline(
        fetcher: MockFetcher,
        existence: MockExistence,
        model: MockLanguageModel,
    ) -> SitePipeline {
        let fetcher = Arc::new(fetcher);
        SitePipeline::new(
            fetcher.clone(),
            fetcher,
            Arc::new(existence),
            Arc::new(model),
        )
        .with_discovery_config(DiscoveryConfig::default().with_politeness_delay_ms(0))
    }

    fn page(url: &str, body: &str) -> FetchedPage {
        FetchedPage::ok(url, body)
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        // Three ranked URLs; the second yields plans; the third is never fetched
        let first = "https://acme.test/plans";
        let second = "https://acme.test/pricing";
        let third = "https://acme.test/buy";

        let fetcher = MockFetcher::new()
            .with_page(page(
                "https://acme.test",
                &format!(
                    r#"<body><a href="{first}">a</a><a href="{second}">b</a><a href="{third}">c</a></body>"#
                ),
            ))
            .with_page(page(first, "<body>tiny</body>"))
            .with_page(page(
                second,
                &format!("<body>{}</body>", "Pro plan pricing details ".repeat(10)),
            ))
            .with_page(page(third, "<body>should never be fetched</body>"));

        let existence = MockExistence::with_live([first, second, third, "https://acme.test"]);

        let model = MockLanguageModel::new()
            .with_response(&format!(
                r#"{{"pricing_urls": ["{first}", "{second}", "{third}"]}}"#
            ))
            .with_response(PLANS_JSON);

        let pipeline = pipeline(fetcher.clone(), existence, model);
        let result = pipeline.process("Acme", "https://acme.test").await;

        assert!(result.success);
        assert_eq!(result.source_url.as_deref(), Some(second));
        assert!(!fetcher.fetched_urls().contains(&third.to_string()));
    }

    #[tokio::test]
    async fn test_empty_ranking_is_failure() {
        let pipeline = pipeline(
            MockFetcher::new(),
            MockExistence::new(),
            MockLanguageModel::new().with_failure("down"),
        );

        let result = pipeline.process("Acme", "https://acme.test").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No pricing pages found"));
    }

    #[tokio::test]
    async fn test_exhausted_urls_records_attempts() {
        let home = "https://acme.test";
        let pricing = "https://acme.test/pricing";

        let fetcher = MockFetcher::new()
            .with_page(page(home, "<body>plain homepage with enough text to analyze here and some more words to cross the minimum threshold for analysis of the content</body>"))
            .with_page(page(pricing, &format!("<body>{}</body>", "pricing words ".repeat(20))));

        let existence = MockExistence::with_live([home, pricing]);

        // Ranking succeeds; both analyses come back with no plans
        let model = MockLanguageModel::new()
            .with_response(&format!(r#"{{"pricing_urls": ["{pricing}", "{home}"]}}"#))
            .with_response(NO_PLANS_JSON)
            .with_response(NO_PLANS_JSON);

        let result = pipeline(fetcher, existence, model)
            .process("Acme", home)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("All URLs failed to yield valid pricing data")
        );
        assert_eq!(result.attempted_urls, vec![pricing.to_string(), home.to_string()]);
    }

    #[tokio::test]
    async fn test_attempt_cap_limits_urls() {
        let urls: Vec<String> = (0..8)
            .map(|i| format!("https://acme.test/p{i}"))
            .collect();

        let mut fetcher = MockFetcher::new();
        for url in &urls {
            fetcher = fetcher.with_page(page(url, "<body>short</body>"));
        }

        let existence =
            MockExistence::with_live(urls.iter().map(String::as_str).chain(["https://acme.test"]));

        let ranked = serde_json::to_string(&urls).unwrap();
        let model = MockLanguageModel::new()
            .with_response(&format!(r#"{{"pricing_urls": {ranked}}}"#));

        let result = pipeline(fetcher, existence, model)
            .process("Acme", "https://acme.test")
            .await;

        assert!(!result.success);
        // The default cap keeps only the first five
        assert_eq!(result.attempted_urls.len(), 5);
    }

    #[tokio::test]
    async fn test_short_content_skipped_without_analysis() {
        let pricing = "https://acme.test/pricing";
        let fetcher = MockFetcher::new().with_page(page(pricing, "<body>tiny</body>"));
        let existence = MockExistence::with_live([pricing]);

        let model = MockLanguageModel::new()
            .with_response(&format!(r#"{{"pricing_urls": ["{pricing}"]}}"#));

        let model_handle = model.clone();
        let result = pipeline(fetcher, existence, model)
            .process("Acme", "https://acme.test")
            .await;

        assert!(!result.success);
        // Only the ranking call reached the model; no analysis happened
        assert_eq!(model_handle.calls().len(), 1);
    }
}
