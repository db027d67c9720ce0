use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use serde::Deserialize;

use super::{IdentityVerifier, VerifiedIdentity, VerifyError};

/// Public keys Google signs Firebase ID tokens with
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Claims we read from a Firebase ID token
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    email: Option<String>,
}

/// Verifies Firebase ID tokens for one project
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    http: reqwest::Client,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: jwks_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn issuer(&self) -> String {
        format!("{}{}", ISSUER_PREFIX, self.project_id)
    }

    async fn fetch_keys(&self) -> Result<JwkSet, VerifyError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))
    }

    /// Check the token's signature and claims against an already-fetched key set
    pub fn verify_with_keys(
        &self,
        token: &str,
        keys: &JwkSet,
    ) -> Result<VerifiedIdentity, VerifyError> {
        let header = signed_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidToken("token header has no kid".to_string()))?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| VerifyError::InvalidToken(format!("no signing key with kid {}", kid)))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| VerifyError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);

        let claims = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| VerifyError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(VerifyError::InvalidToken("empty subject".to_string()));
        }
        let email = claims.email.ok_or(VerifyError::MissingEmail)?;

        Ok(VerifiedIdentity { uid: claims.sub, email })
    }
}

/// Decode the header and insist on RS256 before any network round-trip
fn signed_header(token: &str) -> Result<Header, VerifyError> {
    let header = decode_header(token).map_err(|e| VerifyError::InvalidToken(e.to_string()))?;
    if header.alg != Algorithm::RS256 {
        return Err(VerifyError::InvalidToken(format!("unexpected algorithm {:?}", header.alg)));
    }
    Ok(header)
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        signed_header(token)?;
        let keys = self.fetch_keys().await?;
        self.verify_with_keys(token, &keys)
    }
}
