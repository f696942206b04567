use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use papervault_core::{PaperResponse, SkippedFile};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_submission;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub paper: PaperResponse,
    /// Files left out of the paper, with the reason
    pub skipped: Vec<SkippedFile>,
}

/// Multipart form accepted by `POST /upload` (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Repeat the part once per file
    #[schema(value_type = Vec<String>, format = Binary)]
    files: Vec<Vec<u8>>,
    subject: String,
    semester: String,
    description: Option<String>,
}

/// Submit a paper
///
/// Multipart form with one or more `files` parts plus `subject`, `semester` and
/// `description`. Images are moderated; images and PDFs are compressed when that
/// makes them smaller.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "papers",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Paper created", body = UploadResponse),
        (status = 400, description = "No files uploaded, or none could be accepted", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_paper(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = extract_submission(multipart).await?;
    let report = state.ingest.ingest(request).await?;

    let message = if report.skipped.is_empty() {
        "Paper uploaded".to_string()
    } else {
        format!(
            "Paper uploaded, {} file(s) skipped",
            report.skipped.len()
        )
    };

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message,
            paper: PaperResponse::from(report.paper),
            skipped: report.skipped,
        }),
    ))
}
