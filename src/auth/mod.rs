pub mod firebase;

use async_trait::async_trait;
use thiserror::Error;

pub use firebase::FirebaseVerifier;

/// Identity recovered from a successfully verified bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token carries no email claim")]
    MissingEmail,

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Turns a bearer token into a verified identity.
///
/// Implementations talk to whatever issued the token; the HTTP layer only
/// sees the resulting identity or the reason it was refused.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError>;
}
