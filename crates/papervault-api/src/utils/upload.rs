//! Multipart parsing for paper submissions

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use papervault_core::AppError;
use papervault_services::{IncomingFile, IngestionRequest};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum request size".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Collect the submission fields. Every part named `files` is a file, in the
/// order sent; unknown fields are ignored.
pub async fn extract_submission(mut multipart: Multipart) -> Result<IngestionRequest, AppError> {
    let mut request = IngestionRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string).unwrap_or_default();

        match field_name.as_str() {
            "files" | "files[]" => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                request.files.push(IncomingFile {
                    filename,
                    content_type,
                    data,
                });
            }
            "subject" => request.subject = field.text().await.map_err(multipart_error)?,
            "semester" => request.semester = field.text().await.map_err(multipart_error)?,
            "description" => request.description = field.text().await.map_err(multipart_error)?,
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    Ok(request)
}
