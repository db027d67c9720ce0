use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{VerifiedIdentity, VerifyError};
use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token middleware for protected routes.
///
/// Verifies the token with the configured identity verifier and injects the
/// resulting [`VerifiedIdentity`] into request extensions for handlers.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?.to_string();

    let identity: VerifiedIdentity = state.verifier.verify(&token).await?;
    tracing::debug!("Verified identity {} ({})", identity.email, identity.uid);

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, VerifyError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(VerifyError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| VerifyError::MalformedHeader)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(VerifyError::MalformedHeader),
    }
}
