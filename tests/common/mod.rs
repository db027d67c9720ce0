#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use artifacta_api::auth::{IdentityVerifier, VerifiedIdentity, VerifyError};
use artifacta_api::config::SecurityConfig;
use artifacta_api::database::{
    Artifact, ArtifactId, ArtifactStore, ArtifactUpdate, MemoryStore, NewArtifact, SearchQuery,
    StoreError,
};
use artifacta_api::state::AppState;

/// Accepts tokens of the form `test:<email>` and nothing else
pub struct StaticVerifier;

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        match token.strip_prefix("test:") {
            Some(email) if !email.is_empty() => Ok(VerifiedIdentity {
                uid: format!("uid-{email}"),
                email: email.to_string(),
            }),
            _ => Err(VerifyError::InvalidToken("unknown test token".to_string())),
        }
    }
}

/// A store whose backend is unreachable: every call fails
pub struct OfflineStore;

fn offline() -> StoreError {
    StoreError::InvalidDocument("store offline".to_string())
}

#[async_trait]
impl ArtifactStore for OfflineStore {
    async fn list_all(&self) -> Result<Vec<Artifact>, StoreError> {
        Err(offline())
    }

    async fn get_by_id(&self, _id: &ArtifactId) -> Result<Option<Artifact>, StoreError> {
        Err(offline())
    }

    async fn list_by_owner_email(&self, _email: &str) -> Result<Vec<Artifact>, StoreError> {
        Err(offline())
    }

    async fn list_liked_by_email(&self, _email: &str) -> Result<Vec<Artifact>, StoreError> {
        Err(offline())
    }

    async fn search_by_text(&self, _query: &SearchQuery) -> Result<Vec<Artifact>, StoreError> {
        Err(offline())
    }

    async fn insert(&self, _artifact: NewArtifact) -> Result<ArtifactId, StoreError> {
        Err(offline())
    }

    async fn replace(
        &self,
        _id: &ArtifactId,
        _update: ArtifactUpdate,
    ) -> Result<Artifact, StoreError> {
        Err(offline())
    }

    async fn toggle_like(&self, _id: &ArtifactId, _email: &str) -> Result<bool, StoreError> {
        Err(offline())
    }

    async fn delete(&self, _id: &ArtifactId) -> Result<u64, StoreError> {
        Err(offline())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(offline())
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST an artifact as `owner` and return its new id
    pub async fn create_artifact(&self, body: &Value, owner: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/artifacts"))
            .header("Authorization", bearer(owner))
            .json(body)
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == reqwest::StatusCode::CREATED,
            "create failed: {}",
            res.status()
        );

        let body = res.json::<Value>().await?;
        body["insertedId"]
            .as_str()
            .map(str::to_string)
            .context("insertedId missing from create response")
    }

    pub async fn get_artifact(&self, id: &str) -> Result<Value> {
        let res = self.client.get(self.url(&format!("/artifacts/{id}"))).send().await?;
        Ok(res.json::<Value>().await?)
    }
}

/// Start the real router on a free port, backed by a fresh in-memory store
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(Arc::new(MemoryStore::new())).await
}

pub async fn spawn_server_with(store: Arc<dyn ArtifactStore>) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(store, Arc::new(StaticVerifier));
    let app = artifacta_api::app(state, &SecurityConfig::default());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
    })
}

pub fn bearer(email: &str) -> String {
    format!("Bearer test:{email}")
}

/// A complete artifact body owned by `owner`
pub fn sample_artifact(name: &str, owner: &str) -> Value {
    json!({
        "name": name,
        "imageUrl": format!("https://images.example.com/{}.jpg", name.to_lowercase()),
        "type": "Pottery",
        "historicalContext": "Recovered from a Minoan palace site",
        "shortDescription": "Painted ceramic vessel",
        "presentLocation": "Heraklion Archaeological Museum",
        "createdAt": "2024-05-01T10:00:00Z",
        "addedBy": { "name": "Collector", "email": owner },
        "likedBy": [],
        "likeCount": 0
    })
}
