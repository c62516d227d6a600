//! LLM prompts for URL ranking and pricing analysis.

/// Prompt for picking pricing-likely URLs out of a candidate list.
pub const RANK_URLS_PROMPT: &str = r#"Analyze this list of URLs from {domain} and identify which ones likely contain pricing information.

URLS TO ANALYZE:
{urls}

IMPORTANT: The homepage ({domain}) might contain pricing directly without needing a separate page.

Look for:
1. Obvious pricing pages (/pricing, /plans, /price)
2. Product pages that include pricing sections
3. Service pages with plan comparisons
4. Checkout or order pages
5. The homepage itself if it shows pricing

Return JSON with the most likely pricing URLs:

{
    "pricing_urls": [
        "https://example.com/pricing",
        "https://example.com",
        "https://example.com/product/enterprise"
    ],
    "confidence_scores": {
        "https://example.com/pricing": "high",
        "https://example.com": "medium",
        "https://example.com/product/enterprise": "low"
    }
}

Be comprehensive. Include any URL that might show prices, plans, or subscriptions."#;

/// Prompt for extracting structured pricing from page text.
pub const ANALYZE_PRICING_PROMPT: &str = r#"Analyze this pricing page content from {url} and extract pricing information.

CONTENT:
{content}

Extract to this JSON format:
{
  "currency": "usd",
  "plans": [
    {
      "name": "Plan Name",
      "description": "Plan description",
      "pricing_tiers": [
        {
          "type": "recurring",
          "usage_type": "licensed",
          "billing_period": "monthly",
          "price": 0.0,
          "currency": "usd",
          "features": ["feature1", "feature2"]
        }
      ]
    }
  ]
}

Return ONLY valid JSON."#;

/// Fill the URL-ranking prompt.
pub fn format_rank_urls_prompt(domain: &str, urls: &[String]) -> String {
    let url_list = serde_json::to_string_pretty(urls).unwrap_or_else(|_| urls.join("\n"));
    RANK_URLS_PROMPT
        .replace("{domain}", domain)
        .replace("{urls}", &url_list)
}

/// Fill the pricing-analysis prompt.
pub fn format_analyze_prompt(url: &str, content: &str) -> String {
    ANALYZE_PRICING_PROMPT
        .replace("{url}", url)
        .replace("{content}", content)
}
