use crate::services::prompt::BaseFacts;
use crate::services::text_generator::{GenerationRequest, MAX_VARIANTS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextsRequest {
    pub base_facts: Map<String, Value>,

    #[validate(length(min = 1))]
    pub base_description: String,

    #[validate(range(min = 1, max = 100))]
    pub n: u32,

    pub style_hints: Option<String>,

    /// Accepted for compatibility; the trace is always kept for `/llm/last`.
    #[serde(default)]
    pub debug: bool,
}

impl From<GenerateTextsRequest> for GenerationRequest {
    fn from(req: GenerateTextsRequest) -> Self {
        Self {
            base_facts: BaseFacts::from_json(&req.base_facts),
            base_description: req.base_description,
            n: (req.n as usize).min(MAX_VARIANTS),
            style_hints: req.style_hints,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateTextsResponse {
    pub ok: bool,
    pub variants: Vec<String>,
}

impl GenerateTextsResponse {
    pub fn new(variants: Vec<String>) -> Self {
        Self { ok: true, variants }
    }
}
