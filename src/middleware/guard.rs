use crate::auth::VerifiedIdentity;
use crate::error::ApiError;

/// Owner-restricted operations, each with its own refusal message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedAction {
    Create,
    Update,
    Delete,
}

impl OwnedAction {
    fn forbidden_message(self) -> &'static str {
        match self {
            OwnedAction::Create => "Forbidden: Email mismatch",
            OwnedAction::Update => "Forbidden: You can only update your own artifacts",
            OwnedAction::Delete => "Forbidden: Can only delete your own artifacts",
        }
    }
}

/// The caller may only address their own email in the path
pub fn require_path_identity(identity: &VerifiedIdentity, email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::bad_request("Email parameter is required"));
    }
    if email != identity.email {
        tracing::warn!("Path email {} does not match verified identity {}", email, identity.email);
        return Err(ApiError::forbidden("Forbidden access"));
    }
    Ok(())
}

/// The caller must be the record's `addedBy.email`; a record without an owner
/// belongs to nobody.
pub fn require_owner(
    identity: &VerifiedIdentity,
    owner_email: Option<&str>,
    action: OwnedAction,
) -> Result<(), ApiError> {
    if owner_email != Some(identity.email.as_str()) {
        tracing::warn!(
            "{:?} refused for {}: owner is {}",
            action,
            identity.email,
            owner_email.unwrap_or("<none>")
        );
        return Err(ApiError::forbidden(action.forbidden_message()));
    }
    Ok(())
}
