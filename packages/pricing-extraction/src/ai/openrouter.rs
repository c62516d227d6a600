//! OpenRouter implementation of the LanguageModel trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use pricing_extraction::ai::OpenRouterModel;
//!
//! let model = OpenRouterModel::new("sk-or-...")
//!     .with_model("x-ai/grok-4-fast:free")
//!     .with_attribution("https://example.com", "PricingScout");
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ExtractionError, Result};
use crate::traits::model::LanguageModel;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter-backed language model.
///
/// Sends chat-completion requests with the attribution headers OpenRouter
/// asks applications to carry (`HTTP-Referer`, `X-Title`).
pub struct OpenRouterModel {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
    referer: Option<String>,
    title: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenRouterModel {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
            api_key: SecretString::from(api_key.into()),
            model: "x-ai/grok-4-fast:free".to_string(),
            base_url: OPENROUTER_API_URL.to_string(),
            referer: None,
            title: None,
        }
    }

    /// Create from the `OPENROUTER_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ExtractionError::Config("OPENROUTER_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies or compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the attribution headers OpenRouter uses for app rankings.
    pub fn with_attribution(
        mut self,
        site_url: impl Into<String>,
        site_name: impl Into<String>,
    ) -> Self {
        self.referer = Some(site_url.into());
        self.title = Some(site_name.into());
        self
    }

    /// Get the current model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenRouterModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json");

        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Model(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Model(
                format!("OpenRouter error {}: {}", status, error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Model(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExtractionError::Model("empty response from OpenRouter".into()))
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
