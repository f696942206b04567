//! Admin dashboard endpoints. Routed behind `admin_auth_middleware`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use papervault_core::PaperResponse;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Every paper with every file, ignoring votes
#[utoipa::path(
    get,
    path = "/admin/papers",
    tag = "admin",
    params(
        ("username" = String, Header, description = "Admin username"),
        ("password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "All papers, newest first", body = Vec<PaperResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_all_papers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PaperResponse>>, HttpAppError> {
    Ok(Json(state.papers.service.admin_list().await?))
}

/// Delete a paper and all of its stored files
#[utoipa::path(
    delete,
    path = "/admin/papers/{id}",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Paper ID"),
        ("username" = String, Header, description = "Admin username"),
        ("password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Paper deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Paper not found", body = ErrorResponse),
        (status = 502, description = "A stored file could not be deleted; the paper is kept", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn delete_paper(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    state.papers.service.admin_delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Deleted successfully".to_string(),
    }))
}
