use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use papervault_core::{PaperFile, PaperFileResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    pub message: String,
    pub file: PaperFileResponse,
}

fn vote_response(message: &str, index: usize, file: PaperFile) -> Json<VoteResponse> {
    Json(VoteResponse {
        message: message.to_string(),
        file: PaperFileResponse::new(index, file),
    })
}

#[utoipa::path(
    put,
    path = "/papers/{paper_id}/files/{index}/upvote",
    tag = "votes",
    params(
        ("paper_id" = Uuid, Path, description = "Paper ID"),
        ("index" = usize, Path, description = "File position within the paper")
    ),
    responses(
        (status = 200, description = "Updated file", body = VoteResponse),
        (status = 404, description = "Paper not found or File not found", body = ErrorResponse)
    )
)]
pub async fn upvote(
    State(state): State<Arc<AppState>>,
    Path((paper_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<VoteResponse>, HttpAppError> {
    let file = state.papers.votes.upvote(paper_id, index).await?;
    Ok(vote_response("File upvoted", index, file))
}

#[utoipa::path(
    put,
    path = "/papers/{paper_id}/files/{index}/downvote",
    tag = "votes",
    params(
        ("paper_id" = Uuid, Path, description = "Paper ID"),
        ("index" = usize, Path, description = "File position within the paper")
    ),
    responses(
        (status = 200, description = "Updated file", body = VoteResponse),
        (status = 404, description = "Paper not found or File not found", body = ErrorResponse)
    )
)]
pub async fn downvote(
    State(state): State<Arc<AppState>>,
    Path((paper_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<VoteResponse>, HttpAppError> {
    let file = state.papers.votes.downvote(paper_id, index).await?;
    Ok(vote_response("File downvoted", index, file))
}
