//! Watermark model for listing-service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user watermark settings. One row per user, camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Watermark {
    pub user_id: String,
    pub file_path: String,
    pub sha256: String,
    pub placement: String,
    pub opacity: i64,
    pub margin: i64,
    /// Unix milliseconds.
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// Input for saving a watermark.
#[derive(Debug, Clone)]
pub struct UpsertWatermark {
    pub user_id: String,
    /// Only used when the user row does not exist yet.
    pub username: Option<String>,
    pub file_path: String,
    pub sha256: String,
    pub placement: String,
    pub opacity: i64,
    pub margin: i64,
}
