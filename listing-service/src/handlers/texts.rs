use crate::dtos::texts::{GenerateTextsRequest, GenerateTextsResponse};
use crate::services::dedup::dedupe_exact;
use crate::services::providers::ProviderInfo;
use crate::services::text_generator::{GenerationRequest, LlmTestResult};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::Validate;

/// Always answers 200. Bodies that fail validation get an empty list.
pub async fn generate_texts(
    State(state): State<AppState>,
    body: Result<Json<GenerateTextsRequest>, JsonRejection>,
) -> Json<GenerateTextsResponse> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => {
            tracing::warn!(error = %e.body_text(), "Unparseable texts/generate body");
            return Json(GenerateTextsResponse::new(Vec::new()));
        }
    };
    if let Err(e) = req.validate() {
        tracing::warn!(error = %e, "Invalid texts/generate body");
        return Json(GenerateTextsResponse::new(Vec::new()));
    }

    let request = GenerationRequest::from(req);
    let variants = state.text_generator.generate(&request).await;
    let variants = dedupe_exact(variants, request.n);

    tracing::info!(requested = request.n, returned = variants.len(), "Texts generated");
    Json(GenerateTextsResponse::new(variants))
}

pub async fn llm_debug(State(state): State<AppState>) -> Json<ProviderInfo> {
    Json(state.text_generator.info())
}

/// Last generation trace, or `{}` before the first run.
pub async fn llm_last(State(state): State<AppState>) -> Response {
    match state.text_generator.last_trace().await {
        Some(trace) => Json(trace).into_response(),
        None => Json(json!({})).into_response(),
    }
}

pub async fn llm_test(State(state): State<AppState>) -> Json<LlmTestResult> {
    Json(state.text_generator.test_connection().await)
}
