//! LLM provider abstractions and implementations.
//!
//! The text generator only talks to [`TextProvider`], so the Groq backend can
//! be swapped for the scripted mock in tests.

pub mod groq;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Raw message content; `None` when the model returned no choice.
    pub text: Option<String>,

    pub input_tokens: i32,

    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style `finish_reason` string.
    pub fn from_openai(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") | None => FinishReason::Complete,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
        }
    }
}

/// Sampling parameters for a generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub temperature: Option<f32>,

    pub top_p: Option<f32>,

    pub max_tokens: Option<u32>,

    /// Ask the backend for a JSON object response.
    pub json_output: bool,
}

/// Static description of a provider, reported by `/llm/debug`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub provider: String,
    pub model: String,
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
    pub has_key: bool,
}

/// Trait for text generation backends.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Run one completion for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    fn info(&self) -> ProviderInfo;
}
