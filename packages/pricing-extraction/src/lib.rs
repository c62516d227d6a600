//! Pricing-Page Discovery and Extraction Library
//!
//! Discovers pricing pages on arbitrary company websites and extracts
//! structured pricing records from them. Candidate URLs come from a homepage
//! crawl plus sitemap traversal; a language model ranks the candidates and
//! parses page text into plans, with keyword heuristics as the fallback at
//! every model boundary. Batches of sites are processed sequentially with
//! durable checkpoints, so an interrupted run resumes where it left off.
//!
//! # Design
//!
//! - Best-effort, never fatal: a site that cannot be processed becomes a
//!   failure result, not an aborted batch
//! - Capabilities (fetching, liveness probing, the model) are injected as
//!   traits, so the pipeline runs identically against mocks and against the
//!   real network
//! - One orchestrator for both fetch strategies (plain HTTP vs. rendering
//!   service), selected by configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricing_extraction::{
//!     ai::OpenRouterModel, fetch::HttpFetcher, BatchItem, BatchRunner,
//!     CheckpointStore, ExistenceChecker, SitePipeline,
//! };
//!
//! let fetcher = Arc::new(HttpFetcher::new());
//! let pipeline = SitePipeline::new(
//!     fetcher.clone(),
//!     fetcher,
//!     Arc::new(ExistenceChecker::new()),
//!     Arc::new(OpenRouterModel::from_env()?),
//! );
//! let runner = BatchRunner::new(pipeline, CheckpointStore::new("pricing_results.json"));
//! let summary = runner.run(&[BatchItem::new("Acme", "acme.test")]).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (LanguageModel, PageFetcher)
//! - [`types`] - Pricing records, configs, batch and checkpoint types
//! - [`discovery`] - URL validation, liveness, link collection, sitemaps
//! - [`pipeline`] - Ranking, content extraction, analysis, orchestration
//! - [`batch`] - Batch runner and checkpoint store
//! - [`fetch`] - Fetch strategies (plain HTTP, rendering service)
//! - [`ai`] - Language-model implementations
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod batch;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CrawlError, ExtractionError, ResponseParseError};
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    model::LanguageModel,
};
pub use types::{
    batch::{BatchCheckpoint, BatchItem, BatchSummary},
    config::{BatchConfig, DiscoveryConfig, FetchStrategy, RankerConfig, SiteConfig},
    pricing::{Plan, PricingAnalysis, PricingResult, PricingTier},
};

// Re-export discovery components
pub use discovery::{
    existence::{ExistenceCheck, ExistenceChecker},
    is_candidate_url, LinkCollector, SitemapCrawler,
};

// Re-export pipeline components
pub use pipeline::{
    ContentExtractor, PricingAnalyzer, PricingUrlRanker, SitePipeline,
};

// Re-export batch components
pub use batch::{BatchRunner, CheckpointStore};

// Re-export fetchers
pub use fetch::{HttpFetcher, RenderedFetcher};
