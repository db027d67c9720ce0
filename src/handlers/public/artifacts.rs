use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::database::{Artifact, ArtifactId, SearchQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive text matched against name, type, descriptions and location
    pub q: Option<String>,
}

/// GET /artifacts - List every artifact
pub async fn list_artifacts(State(state): State<AppState>) -> ApiResult<Vec<Artifact>> {
    let artifacts = state.store.list_all().await?;
    Ok(ApiResponse::success(artifacts))
}

/// GET /artifacts/:id - Show one artifact, or `null` when there is none
pub async fn get_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Option<Artifact>> {
    let id: ArtifactId = id.parse()?;
    let artifact = state.store.get_by_id(&id).await?;
    Ok(ApiResponse::success(artifact))
}

/// GET /search-artifacts?q= - Text search across the searchable fields
pub async fn search_artifacts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<Artifact>> {
    let query = SearchQuery::parse(params.q.as_deref())?;
    let artifacts = state.store.search_by_text(&query).await?;
    Ok(ApiResponse::success(artifacts))
}
