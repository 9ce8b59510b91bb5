//! Listing copy generation: prompt the model, keep only distinct variants,
//! retry once, then pad with filler text.

use crate::services::dedup::VariantSet;
use crate::services::metrics::{record_llm_attempt, record_text_variants, LLM_PROVIDER_LATENCY};
use crate::services::prompt::{build_prompt, BaseFacts};
use crate::services::providers::{GenerationParams, ProviderInfo, TextProvider};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Number of model calls before falling back to filler text.
pub const MAX_ATTEMPTS: usize = 2;

/// Upper bound on variants per request.
pub const MAX_VARIANTS: usize = 100;

/// A generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub base_facts: BaseFacts,
    pub base_description: String,
    pub n: usize,
    pub style_hints: Option<String>,
}

/// What happened during the most recent generation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmTrace {
    pub provider: String,
    pub model: String,
    pub requested: usize,
    pub prompt: String,
    pub attempts: Vec<AttemptTrace>,
    pub fallback_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptTrace {
    pub attempt: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub parsed: usize,
    pub accepted: usize,
    pub latency_ms: u64,
}

/// Outcome of a one-off provider round trip.
#[derive(Debug, Clone, Serialize)]
pub struct LlmTestResult {
    pub ok: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct TextGenerator {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
    last_trace: RwLock<Option<LlmTrace>>,
}

impl TextGenerator {
    pub fn new(provider: Arc<dyn TextProvider>, params: GenerationParams) -> Self {
        Self {
            provider,
            params,
            last_trace: RwLock::new(None),
        }
    }

    pub fn info(&self) -> ProviderInfo {
        self.provider.info()
    }

    pub async fn last_trace(&self) -> Option<LlmTrace> {
        self.last_trace.read().await.clone()
    }

    /// Produce exactly `request.n` variants (capped at [`MAX_VARIANTS`]).
    ///
    /// Never fails: provider errors and unusable replies are logged and the
    /// shortfall is filled with [`fallback_variant`] entries.
    #[instrument(skip(self, request), fields(n = request.n))]
    pub async fn generate(&self, request: &GenerationRequest) -> Vec<String> {
        let n = request.n.min(MAX_VARIANTS);
        if n == 0 {
            return Vec::new();
        }

        let info = self.provider.info();
        let prompt = build_prompt(
            &request.base_facts,
            &request.base_description,
            n,
            request.style_hints.as_deref(),
        );

        let mut variants = VariantSet::default();
        let mut attempts = Vec::with_capacity(MAX_ATTEMPTS);

        for attempt in 1..=MAX_ATTEMPTS {
            let timer = LLM_PROVIDER_LATENCY
                .with_label_values(&[&info.provider])
                .start_timer();
            let result = self.provider.generate(&prompt, &self.params).await;
            let latency_ms = (timer.stop_and_record() * 1000.0) as u64;

            match result {
                Ok(response) => {
                    record_llm_attempt(&info.provider, "ok");
                    let raw = response.text.unwrap_or_default();
                    let candidates = parse_variants(&raw);
                    let before = variants.len();

                    for candidate in &candidates {
                        if variants.len() >= n {
                            break;
                        }
                        if candidate.trim().is_empty() {
                            continue;
                        }
                        variants.try_accept(candidate);
                    }

                    tracing::info!(
                        attempt,
                        parsed = candidates.len(),
                        accepted = variants.len() - before,
                        total = variants.len(),
                        input_tokens = response.input_tokens,
                        output_tokens = response.output_tokens,
                        finish_reason = ?response.finish_reason,
                        "LLM attempt finished"
                    );

                    attempts.push(AttemptTrace {
                        attempt,
                        raw: Some(raw),
                        error: None,
                        parsed: candidates.len(),
                        accepted: variants.len() - before,
                        latency_ms,
                    });
                }
                Err(e) => {
                    record_llm_attempt(&info.provider, "provider_error");
                    tracing::error!(attempt, error = %e, "LLM provider call failed");
                    attempts.push(AttemptTrace {
                        attempt,
                        raw: None,
                        error: Some(e.to_string()),
                        parsed: 0,
                        accepted: 0,
                        latency_ms,
                    });
                }
            }

            if variants.len() >= n {
                break;
            }
        }

        let from_model = variants.len();
        {
            // ThreadRng is !Send; keep it out of the await below
            let mut rng = rand::thread_rng();
            while variants.len() < n {
                let position = variants.len() + 1;
                variants.push_unchecked(fallback_variant(
                    &request.base_description,
                    position,
                    rng.gen_range(0..0x100_0000),
                ));
            }
        }
        let fallback_count = variants.len() - from_model;

        if fallback_count > 0 {
            tracing::warn!(
                requested = n,
                from_model,
                fallback_count,
                "Padded text variants with fallback copy"
            );
        }
        record_text_variants("model", from_model);
        record_text_variants("fallback", fallback_count);

        *self.last_trace.write().await = Some(LlmTrace {
            provider: info.provider,
            model: info.model,
            requested: n,
            prompt,
            attempts,
            fallback_count,
            created_at: Utc::now(),
        });

        let mut out = variants.into_vec();
        out.truncate(n);
        out
    }

    /// One small request to verify the provider end to end.
    pub async fn test_connection(&self) -> LlmTestResult {
        let model = self.provider.info().model;
        let params = GenerationParams {
            max_tokens: Some(32),
            ..self.params.clone()
        };

        match self
            .provider
            .generate(
                "Верни JSON-объект {\"variants\": [\"ok\"]} без пояснений.",
                &params,
            )
            .await
        {
            Ok(response) => LlmTestResult {
                ok: true,
                model,
                sample: response.text,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "LLM test call failed");
                LlmTestResult {
                    ok: false,
                    model,
                    sample: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Extract candidate strings from a model reply.
///
/// Accepts a JSON array, an object whose values are all strings, or an
/// object with a `variants` array. Non-string elements are dropped and
/// anything else yields nothing.
pub fn parse_variants(raw: &str) -> Vec<String> {
    let strings = |items: Vec<Value>| -> Vec<String> {
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()
    };

    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Array(items)) => strings(items),
        Ok(Value::Object(mut map)) => {
            if map.values().all(Value::is_string) {
                strings(map.into_iter().map(|(_, v)| v).collect())
            } else if let Some(Value::Array(items)) = map.remove("variants") {
                strings(items)
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Filler copy used when the model could not supply enough variants.
///
/// `position` is the 1-based slot being filled; `suffix` is rendered as six
/// hex digits.
pub fn fallback_variant(base_description: &str, position: usize, suffix: u32) -> String {
    format!(
        "{}\n\n[Вариант {} • {:06x}]",
        base_description,
        position,
        suffix & 0xff_ffff
    )
}
