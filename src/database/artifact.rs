use std::fmt;
use std::str::FromStr;

use mongodb::bson::{oid::ObjectId, to_document, Bson, DateTime, Document};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::api::format::document_to_json;

use super::StoreError;

/// Field names as they appear in stored documents and on the wire
pub mod fields {
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const IMAGE_URL: &str = "imageUrl";
    pub const TYPE: &str = "type";
    pub const HISTORICAL_CONTEXT: &str = "historicalContext";
    pub const SHORT_DESCRIPTION: &str = "shortDescription";
    pub const PRESENT_LOCATION: &str = "presentLocation";
    pub const ADDED_BY: &str = "addedBy";
    pub const EMAIL: &str = "email";
    pub const LIKED_BY: &str = "likedBy";
    pub const LIKE_COUNT: &str = "likeCount";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Fields an update must carry with a non-empty value
pub const REQUIRED_FIELDS: [&str; 5] = [
    fields::NAME,
    fields::IMAGE_URL,
    fields::TYPE,
    fields::HISTORICAL_CONTEXT,
    fields::SHORT_DESCRIPTION,
];

/// Fields scanned by text search
pub const SEARCH_FIELDS: [&str; 5] = [
    fields::NAME,
    fields::TYPE,
    fields::SHORT_DESCRIPTION,
    fields::HISTORICAL_CONTEXT,
    fields::PRESENT_LOCATION,
];

/// Fields an update may never overwrite: identity, ownership, and engagement
/// (the latter only change through the like toggle).
const PROTECTED_FIELDS: [&str; 4] = [
    fields::ID,
    fields::ADDED_BY,
    fields::LIKED_BY,
    fields::LIKE_COUNT,
];

/// Store-generated artifact identifier (a MongoDB ObjectId)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(ObjectId);

impl ArtifactId {
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for ArtifactId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for ArtifactId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// A stored artifact document.
///
/// The collection is schemaless: any field a client sent on creation is kept
/// and returned. Typed accessors cover the fields the API reasons about.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    doc: Document,
}

impl Artifact {
    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    pub fn id(&self) -> Option<ArtifactId> {
        self.doc.get_object_id(fields::ID).ok().map(ArtifactId)
    }

    pub fn owner_email(&self) -> Option<&str> {
        owner_email(&self.doc)
    }

    pub fn liked_by(&self) -> Vec<&str> {
        self.doc
            .get_array(fields::LIKED_BY)
            .map(|emails| emails.iter().filter_map(Bson::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_liked_by(&self, email: &str) -> bool {
        self.liked_by().contains(&email)
    }

    /// Stored like counter; absent or non-numeric counts as zero
    pub fn like_count(&self) -> i64 {
        match self.doc.get(fields::LIKE_COUNT) {
            Some(Bson::Int32(n)) => i64::from(*n),
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Double(n)) => *n as i64,
            _ => 0,
        }
    }

    /// True when any searchable field contains the query, ignoring case
    pub fn matches_search(&self, query: &SearchQuery) -> bool {
        SEARCH_FIELDS
            .iter()
            .filter_map(|field| self.doc.get_str(field).ok())
            .any(|text| query.matches(text))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl Serialize for Artifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        document_to_json(&self.doc).serialize(serializer)
    }
}

/// A creation request body, converted to a document ready for insertion
#[derive(Debug, Clone)]
pub struct NewArtifact {
    doc: Document,
}

impl NewArtifact {
    pub fn from_json(value: Value) -> Result<Self, StoreError> {
        if !value.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let mut doc = body_document(value)?;
        // The store assigns identifiers
        doc.remove(fields::ID);
        Ok(Self { doc })
    }

    /// `addedBy.email` as supplied by the client
    pub fn owner_email(&self) -> Option<&str> {
        owner_email(&self.doc)
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

/// A validated full-field update
#[derive(Debug, Clone)]
pub struct ArtifactUpdate {
    fields: Document,
}

impl ArtifactUpdate {
    pub fn from_json(value: Value) -> Result<Self, StoreError> {
        let empty = match &value {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => return Err(StoreError::NotAnObject),
        };
        if empty {
            return Err(StoreError::EmptyBody);
        }

        let mut doc = body_document(value)?;

        for field in REQUIRED_FIELDS {
            if !doc.get(field).map(is_truthy).unwrap_or(false) {
                return Err(StoreError::MissingField(field));
            }
        }

        for field in PROTECTED_FIELDS {
            doc.remove(field);
        }

        Ok(Self { fields: doc })
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    /// Fields to `$set`, stamped with the update time
    pub fn into_set_document(self, updated_at: DateTime) -> Document {
        let mut set = self.fields;
        set.insert(fields::UPDATED_AT, updated_at);
        set
    }
}

/// Non-empty, case-insensitive substring query
#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    folded: String,
}

impl SearchQuery {
    pub fn parse(raw: Option<&str>) -> Result<Self, StoreError> {
        match raw {
            Some(q) if !q.is_empty() => Ok(Self {
                raw: q.to_string(),
                folded: q.to_lowercase(),
            }),
            _ => Err(StoreError::EmptyQuery),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.folded)
    }

    /// The query as a regular expression matching it literally
    pub fn regex_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.raw.len());
        for c in self.raw.chars() {
            if matches!(
                c,
                '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
            ) {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern
    }
}

/// Convert a JSON request body into a document. Integers beyond the signed
/// 64-bit range have no BSON integer type and are stored as doubles.
fn body_document(value: Value) -> Result<Document, StoreError> {
    to_document(&widen_unsigned(value)).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

fn widen_unsigned(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_u64() && n.as_i64().is_none() => {
            n.as_f64().map(Value::from).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(widen_unsigned).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, widen_unsigned(v))).collect())
        }
        other => other,
    }
}

fn owner_email(doc: &Document) -> Option<&str> {
    doc.get_document(fields::ADDED_BY)
        .ok()
        .and_then(|owner| owner.get_str(fields::EMAIL).ok())
}

/// Presence test used for required update fields: null, false, zero and the
/// empty string all count as missing.
fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => false,
        Bson::Boolean(b) => *b,
        Bson::String(s) => !s.is_empty(),
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0 && !n.is_nan(),
        _ => true,
    }
}
