//! Pricing result types.
//!
//! `Plan` and `PricingTier` mirror the JSON schema the language model is
//! asked to produce. They are deliberately tolerant: every field the model
//! might omit is optional or defaulted, because the schema is a contract
//! with the model, not something we can enforce beyond structural parsing.

use serde::{Deserialize, Serialize};

/// One billing variant within a plan (e.g. monthly vs. annual).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingTier {
    /// Charge type, e.g. "recurring" or "one-time"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tier_type: Option<String>,

    /// Usage model, e.g. "licensed" or "metered"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<String>,

    /// Billing period, e.g. "monthly" or "yearly"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,

    /// Numeric price in the tier's currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Currency code, e.g. "usd"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Features included at this tier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// A named plan with its pricing tiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Plan name as shown on the page
    #[serde(default)]
    pub name: String,

    /// Plan description if the page has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered billing variants for this plan
    #[serde(default)]
    pub pricing_tiers: Vec<PricingTier>,
}

/// Structured output of one pricing-analysis model call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingAnalysis {
    /// Page-level currency if the model identified one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Plans found on the page
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl PricingAnalysis {
    /// Whether the analysis produced at least one plan.
    pub fn has_plans(&self) -> bool {
        !self.plans.is_empty()
    }
}

/// The unit of batch output: one result per input item.
///
/// Exactly one `PricingResult` exists per item name within a batch. Once a
/// result has `success = true` it is never overwritten, because checkpoint
/// resume skips names that already have a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResult {
    /// Site identifier, unique key within a batch
    pub name: String,

    /// The site's base URL as processed
    pub domain: String,

    /// Whether pricing plans were extracted
    pub success: bool,

    /// URL the plans were extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Page-level currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Extracted plans, ordered as the model returned them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<Plan>,

    /// Length of the extracted page text, for diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,

    /// Failure reason, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// URLs tried before giving up
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_urls: Vec<String>,
}

impl PricingResult {
    /// Build a success result from an analysis and its source page.
    pub fn success(
        name: impl Into<String>,
        domain: impl Into<String>,
        source_url: impl Into<String>,
        analysis: PricingAnalysis,
        content_length: usize,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            success: true,
            source_url: Some(source_url.into()),
            currency: analysis.currency,
            plans: analysis.plans,
            content_length: Some(content_length),
            error: None,
            attempted_urls: Vec::new(),
        }
    }

    /// Build a failure result with a reason.
    pub fn failure(
        name: impl Into<String>,
        domain: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            success: false,
            source_url: None,
            currency: None,
            plans: Vec::new(),
            content_length: None,
            error: Some(error.into()),
            attempted_urls: Vec::new(),
        }
    }

    /// Attach the list of URLs that were attempted before failing.
    pub fn with_attempted_urls(mut self, urls: Vec<String>) -> Self {
        self.attempted_urls = urls;
        self
    }
}
