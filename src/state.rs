use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::database::ArtifactStore;

/// Process-scoped resources, built once at startup and handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArtifactStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn ArtifactStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { store, verifier }
    }
}
