//! Parsing of free-text model responses.
//!
//! Models are asked for a single JSON object but routinely wrap it in prose
//! or markdown fences. The contract here is strict and in one place: locate
//! the first balanced brace-delimited span, attempt a strict JSON decode,
//! and return a typed error otherwise - no silent regex guessing.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ResponseParseError;
use crate::types::pricing::Plan;

/// How much raw response text to carry in parse errors.
const EXCERPT_LEN: usize = 500;

/// Expected shape of a URL-ranking response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankerResponse {
    /// URLs the model considers pricing-likely, in its preference order
    #[serde(default)]
    pub pricing_urls: Vec<String>,

    /// Model's own confidence per URL ("high" / "medium" / "low")
    #[serde(default)]
    pub confidence_scores: HashMap<String, String>,
}

/// Expected shape of a pricing-analysis response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResponse {
    /// Page-level currency
    #[serde(default)]
    pub currency: Option<String>,

    /// Extracted plans
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// Locate the first balanced `{...}` span in a response.
///
/// Brace counting is string-aware: braces inside JSON string literals (and
/// escaped quotes inside those) do not affect the balance.
pub fn first_json_object(text: &str) -> Result<&str, ResponseParseError> {
    let start = text.find('{').ok_or_else(|| ResponseParseError::NoJsonObject {
        excerpt: excerpt(text),
    })?;

    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }

        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    // Opened but never closed - truncated response
    Err(ResponseParseError::NoJsonObject {
        excerpt: excerpt(text),
    })
}

/// Locate and strictly decode the first JSON object in a response.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, ResponseParseError> {
    let span = first_json_object(text)?;
    serde_json::from_str(span).map_err(|source| ResponseParseError::InvalidJson {
        source,
        excerpt: excerpt(text),
    })
}

fn excerpt(text: &str) -> String {
    let mut end = EXCERPT_LEN.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
