//! Data types for pricing extraction.

pub mod batch;
pub mod config;
pub mod pricing;

pub use batch::{BatchCheckpoint, BatchItem, BatchSummary};
pub use config::{BatchConfig, DiscoveryConfig, FetchStrategy, RankerConfig, SiteConfig};
pub use pricing::{Plan, PricingAnalysis, PricingResult, PricingTier};
