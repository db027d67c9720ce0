use axum::extract::{rejection::JsonRejection, Extension, Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::auth::VerifiedIdentity;
use crate::database::{Artifact, ArtifactId, ArtifactUpdate, NewArtifact, StoreError};
use crate::error::ApiError;
use crate::middleware::{require_owner, ApiResponse, ApiResult, OwnedAction};
use crate::state::AppState;

/// Insert acknowledgement, shaped like the document driver's own result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Serialize)]
pub struct UpdateOutcome {
    pub message: &'static str,
    pub artifact: Artifact,
}

/// Unwrap a JSON body; a request that sent no JSON at all counts as empty
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(StoreError::EmptyBody.into()),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// POST /artifacts - Add an artifact owned by the caller
///
/// The body is stored as sent; its `addedBy.email` must be the caller's.
pub async fn create_artifact(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<InsertOutcome> {
    let artifact = NewArtifact::from_json(json_body(payload)?)?;
    require_owner(&identity, artifact.owner_email(), OwnedAction::Create)?;

    let id = state.store.insert(artifact).await?;
    tracing::info!("Artifact {} added by {}", id, identity.email);

    Ok(ApiResponse::created(InsertOutcome {
        acknowledged: true,
        inserted_id: id.to_string(),
    }))
}

/// PUT /artifacts/:id - Overwrite an artifact's fields (owner only)
pub async fn update_artifact(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UpdateOutcome> {
    let id: ArtifactId = id.parse()?;

    let existing = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artifact not found"))?;
    require_owner(&identity, existing.owner_email(), OwnedAction::Update)?;

    let update = ArtifactUpdate::from_json(json_body(payload)?)?;
    let artifact = state.store.replace(&id, update).await?;
    tracing::info!("Artifact {} updated by {}", id, identity.email);

    Ok(ApiResponse::success(UpdateOutcome {
        message: "Artifact updated successfully",
        artifact,
    }))
}

/// DELETE /artifacts/:id - Permanently remove an artifact (owner only)
pub async fn delete_artifact(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let id: ArtifactId = id.parse()?;

    let existing = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artifact not found"))?;
    require_owner(&identity, existing.owner_email(), OwnedAction::Delete)?;

    let deleted_count = state.store.delete(&id).await?;
    tracing::info!("Artifact {} deleted by {}", id, identity.email);

    Ok(ApiResponse::success(DeleteOutcome {
        acknowledged: true,
        deleted_count,
    }))
}
