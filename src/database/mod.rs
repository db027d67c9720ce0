pub mod artifact;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use thiserror::Error;

pub use artifact::{Artifact, ArtifactId, ArtifactUpdate, NewArtifact, SearchQuery};
pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Errors from the artifact store and the request types that feed it
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid artifact ID format")]
    InvalidId(String),

    #[error("Artifact not found")]
    NotFound,

    #[error("Request body cannot be empty")]
    EmptyBody,

    #[error("Artifact body must be a JSON object")]
    NotAnObject,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Search query is required")]
    EmptyQuery,

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Single-document operations over the artifacts collection.
///
/// Every method maps onto exactly one store call. Implementations own their
/// own concurrency control; callers never hold state between calls.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// All artifacts, unfiltered and in store order
    async fn list_all(&self) -> Result<Vec<Artifact>, StoreError>;

    async fn get_by_id(&self, id: &ArtifactId) -> Result<Option<Artifact>, StoreError>;

    /// Artifacts whose `addedBy.email` equals `email`
    async fn list_by_owner_email(&self, email: &str) -> Result<Vec<Artifact>, StoreError>;

    /// Artifacts whose `likedBy` set contains `email`
    async fn list_liked_by_email(&self, email: &str) -> Result<Vec<Artifact>, StoreError>;

    async fn search_by_text(&self, query: &SearchQuery) -> Result<Vec<Artifact>, StoreError>;

    /// Store the document as sent and return its generated identifier
    async fn insert(&self, artifact: NewArtifact) -> Result<ArtifactId, StoreError>;

    /// Overwrite the supplied fields, stamp `updatedAt`, and return the stored result
    async fn replace(
        &self,
        id: &ArtifactId,
        update: ArtifactUpdate,
    ) -> Result<Artifact, StoreError>;

    /// Flip `email`'s membership in `likedBy`, adjusting `likeCount` by one.
    /// Returns whether `email` likes the artifact afterwards.
    async fn toggle_like(&self, id: &ArtifactId, email: &str) -> Result<bool, StoreError>;

    /// Remove the artifact, returning the number of deleted documents
    async fn delete(&self, id: &ArtifactId) -> Result<u64, StoreError>;

    /// Round-trip to the backing store
    async fn ping(&self) -> Result<(), StoreError>;
}
