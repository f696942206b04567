use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use papervault_core::{PaperFilter, PaperResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaperListQuery {
    /// Matched case-insensitively
    pub subject: Option<String>,
    pub semester: Option<String>,
}

/// List visible papers, newest first
///
/// Files with three or more downvotes are hidden, and a paper with no visible
/// file is left out entirely. `index` on each file is its position in the stored
/// paper and is what the vote endpoints expect.
#[utoipa::path(
    get,
    path = "/papers",
    tag = "papers",
    params(PaperListQuery),
    responses(
        (status = 200, description = "Visible papers", body = Vec<PaperResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_papers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaperListQuery>,
) -> Result<Json<Vec<PaperResponse>>, HttpAppError> {
    let filter = PaperFilter::new(query.subject.as_deref(), query.semester.as_deref());
    let papers = state.papers.service.list_visible(&filter).await?;
    Ok(Json(papers))
}
