//! Mock provider implementation for testing.

use super::{
    FinishReason, GenerationParams, ProviderError, ProviderInfo, ProviderResponse, TextProvider,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock text provider that replays scripted replies in order.
///
/// Once the script is exhausted every call fails with `ApiError`.
pub struct MockTextProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(ProviderError::ApiError("Mock script exhausted".to_string())))?;

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: reply.len() as i32 / 4,
            text: Some(reply),
            finish_reason: FinishReason::Complete,
        })
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: "mock".to_string(),
            model: "mock-model".to_string(),
            base_url: None,
            has_key: true,
        }
    }
}
