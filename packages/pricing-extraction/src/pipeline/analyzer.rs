//! Structured pricing analysis via the language model.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::pipeline::parse::{parse_json_response, AnalysisResponse};
use crate::pipeline::prompts::format_analyze_prompt;
use crate::traits::model::LanguageModel;
use crate::types::pricing::PricingAnalysis;

/// Sends page text to the model with a fixed extraction schema.
///
/// One attempt only: a response that fails the JSON parse comes back as a
/// typed error carrying a raw-response excerpt for diagnostics, and the
/// orchestrator moves on to the next candidate URL.
pub struct PricingAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl PricingAnalyzer {
    /// Create an analyzer over the given model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Extract structured pricing from page text.
    pub async fn analyze(&self, content: &str, url: &str) -> Result<PricingAnalysis> {
        debug!(url = %url, chars = content.len(), "Analyzing pricing content");

        let prompt = format_analyze_prompt(url, content);
        let response_text = self.model.complete(&prompt).await?;

        let response: AnalysisResponse = parse_json_response(&response_text)?;

        let analysis = PricingAnalysis {
            currency: response.currency,
            plans: response.plans,
        };

        info!(
            url = %url,
            plans = analysis.plans.len(),
            currency = analysis.currency.as_deref().unwrap_or("unknown"),
            "Pricing analysis complete"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, ResponseParseError};
    use crate::testing::MockLanguageModel;

    #[tokio::test]
    async fn test_parses_plan_response() {
        let model = MockLanguageModel::new().with_response(
            r#"{"currency":"usd","plans":[{"name":"Pro","pricing_tiers":[{"price":9.0,"currency":"usd","billing_period":"monthly","features":["X"]}]}]}"#,
        );
        let analyzer = PricingAnalyzer::new(Arc::new(model));

        let analysis = analyzer
            .analyze("Pro plan, $9/month", "https://acme.test/pricing")
            .await
            .unwrap();

        assert_eq!(analysis.currency.as_deref(), Some("usd"));
        assert_eq!(analysis.plans.len(), 1);
        assert_eq!(analysis.plans[0].name, "Pro");
        assert_eq!(analysis.plans[0].pricing_tiers[0].price, Some(9.0));
    }

    #[tokio::test]
    async fn test_non_json_response_is_typed_error() {
        let model =
            MockLanguageModel::new().with_response("Sorry, I cannot analyze that content.");
        let analyzer = PricingAnalyzer::new(Arc::new(model));

        let err = analyzer.analyze("text", "https://acme.test").await.unwrap_err();
        match err {
            ExtractionError::ModelResponse(ResponseParseError::NoJsonObject { excerpt }) => {
                assert!(excerpt.contains("Sorry"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = MockLanguageModel::new().with_failure("model down");
        let analyzer = PricingAnalyzer::new(Arc::new(model));

        let err = analyzer.analyze("text", "https://acme.test").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Model(_)));
    }

    #[tokio::test]
    async fn test_empty_plans_is_valid_analysis() {
        let model = MockLanguageModel::new().with_response(r#"{"currency":"usd","plans":[]}"#);
        let analyzer = PricingAnalyzer::new(Arc::new(model));

        let analysis = analyzer.analyze("text", "https://acme.test").await.unwrap();
        assert!(!analysis.has_plans());
    }
}
