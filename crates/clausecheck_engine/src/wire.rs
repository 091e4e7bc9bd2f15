//! Request/response bodies of the analysis backend.
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub id: String,
    /// Sanitized filename as stored by the backend.
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ComparisonRequest<'a> {
    pub document_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComparisonStarted {
    pub comparison_id: String,
}

/// Shared shape of both status endpoints; the single-document endpoint never
/// carries `error_message`.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub processing_stage: Option<String>,
    #[serde(default)]
    pub progress_percent: Option<u8>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// FastAPI error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
