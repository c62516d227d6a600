//! Language-model trait.
//!
//! The model is an opaque collaborator: one text prompt in, free-form text
//! out. Everything the pipeline knows about the response format (the JSON it
//! asked for) lives in the pipeline's own prompt and parse steps, so any
//! provider can sit behind this trait.

use async_trait::async_trait;

use crate::error::Result;

/// Opaque language-model interface.
///
/// Implementations wrap a specific provider (OpenRouter, OpenAI, a local
/// model) and handle transport, authentication, and per-call timeouts. A
/// call that fails for any reason returns `ExtractionError::Model`; callers
/// treat that uniformly as "no usable result, apply fallback".
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a prompt and return the model's raw text response.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
