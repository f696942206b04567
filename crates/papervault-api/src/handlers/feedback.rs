use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use papervault_core::{CreateFeedbackRequest, Feedback};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
    pub feedback: Feedback,
}

#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "feedback",
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 400, description = "Message is required", body = ErrorResponse)
    )
)]
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let feedback = state.feedback.submit(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            success: true,
            message: "Feedback submitted".to_string(),
            feedback,
        }),
    ))
}
