//! The pricing extraction pipeline: rank, extract, analyze, orchestrate.

pub mod analyzer;
pub mod content;
pub mod parse;
pub mod prompts;
pub mod ranker;
pub mod site;

pub use analyzer::PricingAnalyzer;
pub use content::ContentExtractor;
pub use parse::{first_json_object, parse_json_response, AnalysisResponse, RankerResponse};
pub use prompts::{format_analyze_prompt, format_rank_urls_prompt};
pub use ranker::PricingUrlRanker;
pub use site::SitePipeline;
