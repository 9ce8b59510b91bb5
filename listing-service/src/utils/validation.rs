use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// JSON body that must deserialize and pass `Validate`.
///
/// Both failures reject with 400 `Invalid payload`.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e.body_text(), "Rejected JSON body");
            invalid_payload()
        })?;

        value.validate().map_err(|e| {
            tracing::debug!(error = %e, "Rejected invalid payload");
            invalid_payload()
        })?;

        Ok(ValidatedJson(value))
    }
}

pub fn invalid_payload() -> AppError {
    AppError::BadRequest(anyhow::anyhow!("Invalid payload"))
}
