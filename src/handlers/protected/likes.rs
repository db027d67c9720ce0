use axum::extract::{Extension, Path, State};
use serde::Serialize;

use crate::auth::VerifiedIdentity;
use crate::database::ArtifactId;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
}

/// PATCH /like/:id - Toggle the caller's like on an artifact
///
/// The acting email always comes from the verified token. A request body, if
/// any, is never read.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(id): Path<String>,
) -> ApiResult<LikeOutcome> {
    let id: ArtifactId = id.parse()?;

    let liked = state.store.toggle_like(&id, &identity.email).await?;
    let verb = if liked { "liked" } else { "unliked" };
    tracing::debug!("{} {} artifact {}", identity.email, verb, id);

    Ok(ApiResponse::success(LikeOutcome { liked }))
}
