//! Pricing-URL ranking: priority sampling, model selection, heuristic
//! fallback.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::discovery::existence::ExistenceCheck;
use crate::pipeline::parse::{parse_json_response, RankerResponse};
use crate::pipeline::prompts::format_rank_urls_prompt;
use crate::traits::model::LanguageModel;
use crate::types::config::RankerConfig;

/// Keywords marking a URL as almost certainly pricing-related.
const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "pricing",
    "price",
    "plan",
    "buy",
    "subscribe",
    "order",
    "checkout",
];

/// Keywords marking a URL as plausibly pricing-adjacent.
const MEDIUM_PRIORITY_KEYWORDS: &[&str] = &[
    "product",
    "feature",
    "service",
    "solution",
    "package",
    "tier",
];

/// Keywords used by the heuristic fallback.
const FALLBACK_KEYWORDS: &[&str] = &["pricing", "price", "plans", "plan", "subscribe", "buy", "order"];

/// Ranks candidate URLs by how likely they are to show pricing.
///
/// The model does the real ranking; this type owns everything around it:
/// keeping the candidate list inside a token budget via priority sampling,
/// verifying the model's suggestions actually resolve, and the keyword
/// heuristic that takes over whenever the model is unavailable or
/// unparseable. Ranking is never fatal - some list always comes back.
pub struct PricingUrlRanker {
    model: Arc<dyn LanguageModel>,
    existence: Arc<dyn ExistenceCheck>,
    config: RankerConfig,
}

impl PricingUrlRanker {
    /// Create a ranker over the given model and liveness capabilities.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        existence: Arc<dyn ExistenceCheck>,
        config: RankerConfig,
    ) -> Self {
        Self {
            model,
            existence,
            config,
        }
    }

    /// Rank candidates into an ordered list of likely pricing URLs.
    pub async fn rank(&self, domain: &str, candidates: HashSet<String>) -> Vec<String> {
        let mut candidates: Vec<String> = candidates.into_iter().collect();
        candidates.sort();

        if !candidates.iter().any(|c| c == domain) {
            candidates.push(domain.to_string());
        }

        if candidates.len() > self.config.candidate_budget {
            info!(
                total = candidates.len(),
                budget = self.config.candidate_budget,
                "Too many candidates, priority sampling"
            );
            candidates = priority_sample(domain, candidates, self.config.candidate_budget);
        }

        match self.rank_with_model(domain, &candidates).await {
            Ok(urls) => urls,
            Err(reason) => {
                warn!(domain = %domain, reason = %reason, "Model ranking unusable, using heuristic fallback");
                self.heuristic_fallback(domain, &candidates).await
            }
        }
    }

    /// Ask the model for pricing URLs and verify each suggestion resolves.
    async fn rank_with_model(
        &self,
        domain: &str,
        candidates: &[String],
    ) -> std::result::Result<Vec<String>, String> {
        let prompt = format_rank_urls_prompt(domain, candidates);

        let response_text = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| e.to_string())?;
        debug!(len = response_text.len(), "Model ranking response received");

        let response: RankerResponse =
            parse_json_response(&response_text).map_err(|e| e.to_string())?;

        if response.pricing_urls.is_empty() {
            return Err("model returned no pricing URLs".to_string());
        }

        let mut valid_urls = Vec::new();
        for url in response.pricing_urls {
            if self.existence.exists(&url).await {
                let confidence = response
                    .confidence_scores
                    .get(&url)
                    .map(String::as_str)
                    .unwrap_or("unknown");
                debug!(url = %url, confidence = confidence, "Model-suggested URL verified");
                valid_urls.push(url);
            } else {
                debug!(url = %url, "Model-suggested URL does not resolve, discarding");
            }
        }

        info!(count = valid_urls.len(), "Model identified pricing URLs");
        Ok(valid_urls)
    }

    /// Keyword-heuristic ranking used when the model yields nothing usable.
    ///
    /// Filters candidates by pricing keywords, always includes the homepage
    /// if it is live, and probes a fixed list of common pricing paths.
    pub async fn heuristic_fallback(&self, domain: &str, candidates: &[String]) -> Vec<String> {
        let mut fallback_urls = Vec::new();

        for candidate in candidates {
            let lower = candidate.to_lowercase();
            if FALLBACK_KEYWORDS.iter().any(|k| lower.contains(k))
                && self.existence.exists(candidate).await
            {
                fallback_urls.push(candidate.clone());
            }
        }

        if !fallback_urls.iter().any(|u| u == domain) && self.existence.exists(domain).await {
            fallback_urls.push(domain.to_string());
        }

        if let Ok(base) = Url::parse(domain) {
            for path in &self.config.fallback_paths {
                let Ok(url) = base.join(path) else { continue };
                let url = url.to_string();
                if !fallback_urls.contains(&url) && self.existence.exists(&url).await {
                    fallback_urls.push(url);
                }
            }
        }

        info!(count = fallback_urls.len(), "Heuristic fallback found pricing URLs");
        fallback_urls
    }
}

/// Reduce an oversized candidate list, keeping keyword-matched URLs first.
///
/// High-priority matches fill up to a third of the budget, medium-priority
/// matches half of what remains, and the rest is filled with whatever is
/// left. The homepage is re-added if sampling dropped it.
fn priority_sample(domain: &str, candidates: Vec<String>, budget: usize) -> Vec<String> {
    let matches_any = |url: &str, keywords: &[&str]| {
        let lower = url.to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    };

    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();

    for url in candidates {
        if matches_any(&url, HIGH_PRIORITY_KEYWORDS) {
            high.push(url);
        } else if matches_any(&url, MEDIUM_PRIORITY_KEYWORDS) {
            medium.push(url);
        } else {
            low.push(url);
        }
    }

    let mut sampled: Vec<String> = high.into_iter().take(budget / 3).collect();

    let remaining = budget - sampled.len();
    sampled.extend(medium.into_iter().take(remaining / 2));

    let remaining = budget - sampled.len();
    sampled.extend(low.into_iter().take(remaining));

    if !sampled.iter().any(|u| u == domain) {
        sampled.push(domain.to_string());
    }

    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExistence, MockLanguageModel};

    fn ranker(model: MockLanguageModel, live: &[&str]) -> PricingUrlRanker {
        PricingUrlRanker::new(
            Arc::new(model),
            Arc::new(MockExistence::with_live(live.iter().copied())),
            RankerConfig::default(),
        )
    }

    fn candidates(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_model_ranking_verified_by_existence() {
        let model = MockLanguageModel::new().with_response(
            r#"{"pricing_urls": ["https://acme.test/pricing", "https://acme.test/gone"]}"#,
        );
        let ranker = ranker(model, &["https://acme.test/pricing"]);

        let urls = ranker
            .rank("https://acme.test", candidates(&["https://acme.test/pricing"]))
            .await;

        // The dead suggestion is discarded, not retried
        assert_eq!(urls, vec!["https://acme.test/pricing"]);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_heuristic() {
        let cands = &[
            "https://acme.test/pricing",
            "https://acme.test/about",
        ];
        let live = &["https://acme.test/pricing", "https://acme.test"];

        let failing = ranker(MockLanguageModel::new().with_failure("model down"), live);
        let from_failure = failing.rank("https://acme.test", candidates(cands)).await;

        // The fallback output alone, for the same inputs
        let reference = ranker(MockLanguageModel::new(), live);
        let mut sorted: Vec<String> = candidates(cands).into_iter().collect();
        sorted.sort();
        sorted.push("https://acme.test".to_string());
        let expected = reference
            .heuristic_fallback("https://acme.test", &sorted)
            .await;

        assert_eq!(from_failure, expected);
        assert!(from_failure.contains(&"https://acme.test/pricing".to_string()));
        assert!(from_failure.contains(&"https://acme.test".to_string()));
    }

    #[tokio::test]
    async fn test_non_json_response_falls_back() {
        let model = MockLanguageModel::new().with_response("I could not find any JSON to give you.");
        let ranker = ranker(model, &["https://acme.test"]);

        let urls = ranker.rank("https://acme.test", candidates(&[])).await;
        assert_eq!(urls, vec!["https://acme.test"]);
    }

    #[tokio::test]
    async fn test_empty_model_list_falls_back() {
        let model = MockLanguageModel::new().with_response(r#"{"pricing_urls": []}"#);
        let ranker = ranker(model, &["https://acme.test"]);

        let urls = ranker.rank("https://acme.test", candidates(&[])).await;
        assert_eq!(urls, vec!["https://acme.test"]);
    }

    #[test]
    fn test_priority_sample_orders_by_keyword_class() {
        let mut candidates: Vec<String> = (0..500)
            .map(|i| format!("https://acme.test/page-{i}"))
            .collect();
        candidates.push("https://acme.test/pricing".to_string());
        candidates.push("https://acme.test/product/x".to_string());

        let sampled = priority_sample("https://acme.test", candidates, 400);

        assert!(sampled.len() <= 401); // budget + possibly re-added homepage
        assert_eq!(sampled[0], "https://acme.test/pricing");
        assert_eq!(sampled[1], "https://acme.test/product/x");
        assert!(sampled.iter().any(|u| u == "https://acme.test"));
    }

    #[test]
    fn test_priority_sample_within_budget_shares() {
        let high: Vec<String> = (0..300)
            .map(|i| format!("https://acme.test/pricing/{i}"))
            .collect();
        let sampled = priority_sample("https://acme.test", high, 300);

        // High class is capped at a third of the budget
        let high_count = sampled.iter().filter(|u| u.contains("pricing")).count();
        assert_eq!(high_count, 100);
    }
}
