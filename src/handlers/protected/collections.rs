use axum::extract::{Extension, Path, State};

use crate::auth::VerifiedIdentity;
use crate::database::Artifact;
use crate::middleware::{require_path_identity, ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /artifacts/myCollection/:email - Artifacts the caller added
pub async fn my_collection(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(email): Path<String>,
) -> ApiResult<Vec<Artifact>> {
    require_path_identity(&identity, &email)?;

    let artifacts = state.store.list_by_owner_email(&email).await?;
    Ok(ApiResponse::success(artifacts))
}

/// GET /artifacts/likedBy/:email - Artifacts the caller liked
pub async fn liked_by(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(email): Path<String>,
) -> ApiResult<Vec<Artifact>> {
    require_path_identity(&identity, &email)?;

    let artifacts = state.store.list_liked_by_email(&email).await?;
    Ok(ApiResponse::success(artifacts))
}
