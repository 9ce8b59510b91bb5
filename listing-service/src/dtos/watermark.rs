use crate::models::UpsertWatermark;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveWatermarkRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    pub username: Option<String>,

    #[validate(length(min = 1, message = "filePath is required"))]
    pub file_path: String,

    #[validate(length(min = 1, message = "sha256 is required"))]
    pub sha256: String,

    #[validate(length(min = 1, message = "placement is required"))]
    pub placement: String,

    pub opacity: i64,

    pub margin: i64,
}

impl From<SaveWatermarkRequest> for UpsertWatermark {
    fn from(req: SaveWatermarkRequest) -> Self {
        Self {
            user_id: req.user_id,
            username: req.username.filter(|u| !u.is_empty()),
            file_path: req.file_path,
            sha256: req.sha256,
            placement: req.placement,
            opacity: req.opacity,
            margin: req.margin,
        }
    }
}
