use async_trait::async_trait;
use mongodb::bson::{Bson, DateTime, Document};
use tokio::sync::RwLock;

use super::artifact::fields;
use super::{
    Artifact, ArtifactId, ArtifactStore, ArtifactUpdate, NewArtifact, SearchQuery, StoreError,
};

/// In-process artifact store for local development and tests.
///
/// Documents keep insertion order. Every write holds the lock for its whole
/// read-modify-write, so the like toggle is atomic here too.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, predicate: impl Fn(&Artifact) -> bool) -> Vec<Artifact> {
        let docs = self.docs.read().await;
        docs.iter()
            .cloned()
            .map(Artifact::from_document)
            .filter(|artifact| predicate(artifact))
            .collect()
    }
}

fn position(docs: &[Document], id: &ArtifactId) -> Option<usize> {
    let oid = id.object_id();
    docs.iter().position(|doc| doc.get_object_id(fields::ID).ok() == Some(oid))
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.select(|_| true).await)
    }

    async fn get_by_id(&self, id: &ArtifactId) -> Result<Option<Artifact>, StoreError> {
        Ok(self.select(|artifact| artifact.id().as_ref() == Some(id)).await.into_iter().next())
    }

    async fn list_by_owner_email(&self, email: &str) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.select(|artifact| artifact.owner_email() == Some(email)).await)
    }

    async fn list_liked_by_email(&self, email: &str) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.select(|artifact| artifact.is_liked_by(email)).await)
    }

    async fn search_by_text(&self, query: &SearchQuery) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.select(|artifact| artifact.matches_search(query)).await)
    }

    async fn insert(&self, artifact: NewArtifact) -> Result<ArtifactId, StoreError> {
        let id = ArtifactId::generate();
        let mut doc = Document::new();
        doc.insert(fields::ID, id.object_id());
        for (key, value) in artifact.into_document() {
            doc.insert(key, value);
        }

        self.docs.write().await.push(doc);
        Ok(id)
    }

    async fn replace(
        &self,
        id: &ArtifactId,
        update: ArtifactUpdate,
    ) -> Result<Artifact, StoreError> {
        let mut docs = self.docs.write().await;
        let index = position(&docs, id).ok_or(StoreError::NotFound)?;

        let doc = &mut docs[index];
        for (key, value) in update.into_set_document(DateTime::now()) {
            doc.insert(key, value);
        }
        Ok(Artifact::from_document(doc.clone()))
    }

    async fn toggle_like(&self, id: &ArtifactId, email: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let index = position(&docs, id).ok_or(StoreError::NotFound)?;

        let current = Artifact::from_document(docs[index].clone());
        let already_liked = current.is_liked_by(email);
        let mut liked_by: Vec<Bson> = current
            .liked_by()
            .into_iter()
            .filter(|member| *member != email)
            .map(Bson::from)
            .collect();
        let like_count = if already_liked {
            current.like_count() - 1
        } else {
            liked_by.push(Bson::from(email));
            current.like_count() + 1
        };

        let doc = &mut docs[index];
        doc.insert(fields::LIKED_BY, liked_by);
        doc.insert(fields::LIKE_COUNT, like_count);
        Ok(!already_liked)
    }

    async fn delete(&self, id: &ArtifactId) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let index = position(&docs, id).ok_or(StoreError::NotFound)?;
        docs.remove(index);
        Ok(1)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
