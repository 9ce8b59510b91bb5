pub mod texts;
pub mod watermark;
pub mod zip;

use serde::Serialize;

/// `{ "ok": true }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
