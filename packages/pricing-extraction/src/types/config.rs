//! Configuration types for discovery, ranking, and batch processing.

use serde::{Deserialize, Serialize};

/// Which fetch strategy the content extractor uses.
///
/// Discovery (link collection, sitemaps, existence probes) always uses plain
/// HTTP; only content extraction is swappable, so both pipeline variants
/// share one orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchStrategy {
    /// Plain HTTP fetch with browser-like headers
    #[default]
    Http,

    /// Rendering service that executes page scripts before extraction
    Rendered,
}

/// Configuration for link collection and sitemap traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Delay between successive page fetches, milliseconds
    pub politeness_delay_ms: u64,

    /// Relative paths probed for extra links beyond the homepage
    pub important_paths: Vec<String>,

    /// Hard cap on sitemap queue iterations
    pub max_sitemap_iterations: usize,

    /// Hard cap on nested sitemap-index depth
    pub max_sitemap_depth: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            politeness_delay_ms: 1000,
            important_paths: [
                "/features",
                "/product",
                "/products",
                "/solutions",
                "/services",
                "/pricing",
                "/plans",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_sitemap_iterations: 50,
            max_sitemap_depth: 10,
        }
    }
}

impl DiscoveryConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the politeness delay between fetches.
    pub fn with_politeness_delay_ms(mut self, ms: u64) -> Self {
        self.politeness_delay_ms = ms;
        self
    }

    /// Replace the important-path probe list.
    pub fn with_important_paths(
        mut self,
        paths: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.important_paths = paths.into_iter().map(|p| p.into()).collect();
        self
    }
}

/// Configuration for the pricing-URL ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Candidate-count budget before priority sampling kicks in
    pub candidate_budget: usize,

    /// Common pricing paths probed directly in the heuristic fallback
    pub fallback_paths: Vec<String>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            candidate_budget: 400,
            fallback_paths: ["/pricing", "/price", "/plans", "/plan", "/subscription"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RankerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate budget.
    pub fn with_candidate_budget(mut self, budget: usize) -> Self {
        self.candidate_budget = budget;
        self
    }
}

/// Configuration for per-site orchestration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// How many ranked URLs to try before giving up; `None` = try them all
    pub max_url_attempts: Option<usize>,

    /// Minimum extracted-content length worth analyzing
    pub min_content_length: usize,

    /// Extracted content is truncated to this many characters
    pub max_content_length: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            max_url_attempts: Some(5),
            min_content_length: 100,
            max_content_length: 50_000,
        }
    }
}

impl SiteConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL attempt cap (`None` removes the cap).
    pub fn with_max_url_attempts(mut self, cap: Option<usize>) -> Self {
        self.max_url_attempts = cap;
        self
    }
}

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Delay between successive sites, milliseconds
    pub inter_site_delay_ms: u64,

    /// Optional wall-clock timeout per site, seconds
    pub site_timeout_secs: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_site_delay_ms: 2000,
            site_timeout_secs: None,
        }
    }
}

impl BatchConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inter-site delay.
    pub fn with_inter_site_delay_ms(mut self, ms: u64) -> Self {
        self.inter_site_delay_ms = ms;
        self
    }

    /// Set the per-site timeout.
    pub fn with_site_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.site_timeout_secs = secs;
        self
    }
}
