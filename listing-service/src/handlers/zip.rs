use crate::dtos::zip::{CreateZipRequest, CreateZipResponse};
use crate::services::metrics::record_archive;
use crate::services::{create_zip_blocking, ArchiveError, ArchiveRequest};
use crate::utils::ValidatedJson;
use axum::Json;
use service_core::error::AppError;

pub async fn create_zip(
    ValidatedJson(req): ValidatedJson<CreateZipRequest>,
) -> Result<Json<CreateZipResponse>, AppError> {
    let request = ArchiveRequest::from(req);

    match create_zip_blocking(request).await {
        Ok(summary) => {
            record_archive("ok");
            Ok(Json(CreateZipResponse::from(summary)))
        }
        Err(e @ ArchiveError::InputNotFound(_)) => {
            record_archive("rejected");
            Err(AppError::BadRequest(anyhow::anyhow!(e.to_string())))
        }
        Err(e) => {
            record_archive("failed");
            tracing::error!(error = %e, "Zip creation failed");
            Err(AppError::InternalError(
                anyhow::Error::new(e).context("Zip failed"),
            ))
        }
    }
}
