use crate::dtos::watermark::SaveWatermarkRequest;
use crate::dtos::OkResponse;
use crate::models::{UpsertWatermark, Watermark};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use anyhow::Context;
use axum::extract::{Path, State};
use axum::Json;
use service_core::error::AppError;
use std::path::Path as FsPath;

/// Returns the stored watermark, or `null` when the user has none.
pub async fn get_watermark(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Option<Watermark>>, AppError> {
    let watermark = state
        .db
        .get_watermark(&user_id)
        .await
        .context("Failed to get watermark")?;
    Ok(Json(watermark))
}

pub async fn save_watermark(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SaveWatermarkRequest>,
) -> Result<Json<OkResponse>, AppError> {
    let input = UpsertWatermark::from(req);

    if let Some(dir) = FsPath::new(&input.file_path).parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                tracing::error!(dir = %dir.display(), error = %e, "Failed to create watermark directory");
                anyhow::Error::new(e).context("Failed to save watermark")
            })?;
        }
    }

    let saved = state
        .db
        .upsert_watermark(&input)
        .await
        .context("Failed to save watermark")?;
    tracing::info!(
        user_id = %saved.user_id,
        placement = %saved.placement,
        "Watermark saved"
    );

    Ok(Json(OkResponse::ok()))
}
