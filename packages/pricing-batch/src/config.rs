use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::SecretString;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: SecretString,
    pub site_url: String,
    pub site_name: String,
    pub model: String,
    pub rendering_url: Option<String>,
    pub rendering_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            openrouter_api_key: env::var("OPENROUTER_API_KEY")
                .map(SecretString::from)
                .context("OPENROUTER_API_KEY must be set")?,
            site_url: env::var("SITE_URL").unwrap_or_else(|_| "https://example.com".to_string()),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "PricingExtractor".to_string()),
            model: env::var("MODEL").unwrap_or_else(|_| "x-ai/grok-4-fast:free".to_string()),
            rendering_url: env::var("RENDERING_URL").ok(),
            rendering_token: env::var("RENDERING_TOKEN").ok(),
        })
    }
}
