use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, ReturnDocument, ServerApi, ServerApiVersion,
};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use crate::config::DatabaseConfig;

use super::artifact::SEARCH_FIELDS;
use super::{
    Artifact, ArtifactId, ArtifactStore, ArtifactUpdate, NewArtifact, SearchQuery, StoreError,
};

/// MongoDB-backed artifact store
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Build a client on the Stable API (v1, strict) and bind the artifacts collection.
    ///
    /// The driver connects lazily; the first operation or `ping` surfaces
    /// connection problems.
    pub async fn connect(uri: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        options.server_api = Some(server_api);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        let collection = client
            .database(&config.database_name)
            .collection::<Document>(&config.collection_name);

        info!(
            "Bound MongoDB collection {}.{}",
            config.database_name, config.collection_name
        );
        Ok(Self { client, collection })
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<Artifact>, StoreError> {
        let cursor = self.collection.find(filter, None).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Artifact::from_document).collect())
    }
}

fn id_filter(id: &ArtifactId) -> Document {
    doc! { "_id": id.object_id() }
}

/// `$or` of case-insensitive literal regex matches over the searchable fields
fn search_filter(query: &SearchQuery) -> Document {
    let pattern = query.regex_pattern();
    let clauses: Vec<Document> = SEARCH_FIELDS
        .iter()
        .map(|field| {
            let mut clause = Document::new();
            clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
            clause
        })
        .collect();
    doc! { "$or": clauses }
}

/// Single-stage update pipeline that flips `email`'s membership in `likedBy`
/// and moves `likeCount` with it. Both `$cond`s read the pre-update document,
/// so the pair is applied atomically by the server.
///
/// Pipeline expressions read any string starting with `$` as a field path, so
/// the email only ever appears wrapped in `$literal`.
fn toggle_like_pipeline(email: &str) -> Vec<Document> {
    let email = doc! { "$literal": email };
    let liked_by = doc! { "$ifNull": ["$likedBy", []] };
    let like_count = doc! { "$ifNull": ["$likeCount", 0] };
    let already_liked = doc! { "$in": [email.clone(), liked_by.clone()] };

    vec![doc! {
        "$set": {
            "likeCount": {
                "$cond": [
                    already_liked.clone(),
                    { "$subtract": [like_count.clone(), 1] },
                    { "$add": [like_count, 1] }
                ]
            },
            "likedBy": {
                "$cond": [
                    already_liked,
                    { "$setDifference": [liked_by.clone(), [email.clone()]] },
                    { "$concatArrays": [liked_by, [email]] }
                ]
            }
        }
    }]
}

fn return_updated() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

#[async_trait]
impl ArtifactStore for MongoStore {
    async fn list_all(&self) -> Result<Vec<Artifact>, StoreError> {
        self.find_many(doc! {}).await
    }

    async fn get_by_id(&self, id: &ArtifactId) -> Result<Option<Artifact>, StoreError> {
        let found = self.collection.find_one(id_filter(id), None).await?;
        Ok(found.map(Artifact::from_document))
    }

    async fn list_by_owner_email(&self, email: &str) -> Result<Vec<Artifact>, StoreError> {
        self.find_many(doc! { "addedBy.email": email }).await
    }

    async fn list_liked_by_email(&self, email: &str) -> Result<Vec<Artifact>, StoreError> {
        self.find_many(doc! { "likedBy": email }).await
    }

    async fn search_by_text(&self, query: &SearchQuery) -> Result<Vec<Artifact>, StoreError> {
        debug!("Searching artifacts for {:?}", query.as_str());
        self.find_many(search_filter(query)).await
    }

    async fn insert(&self, artifact: NewArtifact) -> Result<ArtifactId, StoreError> {
        let result = self.collection.insert_one(artifact.into_document(), None).await?;
        result
            .inserted_id
            .as_object_id()
            .map(ArtifactId::from)
            .ok_or_else(|| {
                StoreError::InvalidDocument(format!(
                    "unexpected inserted id {}",
                    result.inserted_id
                ))
            })
    }

    async fn replace(
        &self,
        id: &ArtifactId,
        update: ArtifactUpdate,
    ) -> Result<Artifact, StoreError> {
        let set = update.into_set_document(DateTime::now());
        self.collection
            .find_one_and_update(id_filter(id), doc! { "$set": set }, return_updated())
            .await?
            .map(Artifact::from_document)
            .ok_or(StoreError::NotFound)
    }

    async fn toggle_like(&self, id: &ArtifactId, email: &str) -> Result<bool, StoreError> {
        let updated = self
            .collection
            .find_one_and_update(id_filter(id), toggle_like_pipeline(email), return_updated())
            .await?
            .map(Artifact::from_document)
            .ok_or(StoreError::NotFound)?;
        Ok(updated.is_liked_by(email))
    }

    async fn delete(&self, id: &ArtifactId) -> Result<u64, StoreError> {
        let result = self.collection.delete_one(id_filter(id), None).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}
