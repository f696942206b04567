use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use papervault_core::{CreateSubjectRequest, Subject};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectListResponse {
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectCreatedResponse {
    pub message: String,
    pub subject: Subject,
}

/// All subjects, sorted by name
#[utoipa::path(
    get,
    path = "/api/subjects",
    tag = "subjects",
    responses(
        (status = 200, description = "Subjects", body = SubjectListResponse)
    )
)]
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SubjectListResponse>, HttpAppError> {
    let subjects = state.subjects.list().await?;
    Ok(Json(SubjectListResponse { subjects }))
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    tag = "subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject added", body = SubjectCreatedResponse),
        (status = 400, description = "Subject name is required, or Subject already exists", body = ErrorResponse)
    )
)]
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateSubjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let subject = state.subjects.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubjectCreatedResponse {
            message: "Subject added".to_string(),
            subject,
        }),
    ))
}
