//! Groq provider implementation.
//!
//! Groq exposes an OpenAI-compatible chat completions API, so the wire types
//! below follow that format.

use super::{
    FinishReason, GenerationParams, ProviderError, ProviderInfo, ProviderResponse, TextProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// Groq provider configuration.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Groq text provider.
pub struct GroqTextProvider {
    config: GroqConfig,
    client: Client,
}

impl GroqTextProvider {
    pub fn new(config: GroqConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        let key = self.config.api_key.expose_secret();
        if key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "GROQ_API_KEY is not set".to_string(),
            ));
        }
        Ok(key)
    }
}

#[async_trait]
impl TextProvider for GroqTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let api_key = self.api_key()?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            top_p: params.top_p,
            max_completion_tokens: params.max_tokens,
            response_format: params.json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Groq API"
        );

        let response = self
            .client
            .traced_post(&self.api_url("chat/completions"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Groq API error {}: {}",
                status, error_text
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let choice = api_response.choices.into_iter().next();
        let finish_reason = FinishReason::from_openai(
            choice.as_ref().and_then(|c| c.finish_reason.as_deref()),
        );
        let text = choice.and_then(|c| c.message.content);
        let usage = api_response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
            finish_reason,
        })
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: "groq".to_string(),
            model: self.config.model.clone(),
            base_url: Some(self.config.base_url.clone()),
            has_key: !self.config.api_key.expose_secret().is_empty(),
        }
    }
}

// ============================================================================
// Chat Completions Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    prompt_tokens: Option<i32>,
    completion_tokens: Option<i32>,
}
