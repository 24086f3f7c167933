//! Document storage.
//!
//! Documents are JSON objects addressed by a slash-separated collection path
//! and an id: `batches/{id}` for a batch, `batches/{id}/registrations/{rid}`
//! for one of its registrations. Two backends share one interface:
//!
//! - [`PgStore`]: a single JSONB table in PostgreSQL (production)
//! - [`MemoryStore`]: nested maps behind a lock (development and tests)
//!
//! Date fields are written as [`Timestamp`] objects and converted to ISO-8601
//! strings by the model layer through [`Document::timestamp_field`].

mod memory;
pub mod paths;
mod postgres;
pub mod timestamp;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use timestamp::Timestamp;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{Map, Value};

/// Field map of a single document.
pub type Fields = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid value: {0}")]
    Invalid(String),
    #[error("document {collection}/{id} is malformed: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },
}

/// A stored document together with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: String,
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(collection: &str, id: &str, fields: Fields) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        }
    }

    /// Id of the owning document for subcollection entries
    /// (`batches/b1/registrations` -> `b1`). `None` for top-level collections.
    pub fn parent_id(&self) -> Option<&str> {
        let mut segments = self.collection.rsplit('/');
        segments.next()?;
        segments.next()
    }

    pub fn malformed(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            collection: self.collection.clone(),
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<String, StoreError> {
        self.str_field(key)
            .map(str::to_string)
            .ok_or_else(|| self.malformed(format!("missing string field `{key}`")))
    }

    pub fn optional_str(&self, key: &str) -> Option<String> {
        self.str_field(key)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Reads a date field in any accepted stored shape.
    pub fn timestamp_field(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        let value = self
            .fields
            .get(key)
            .ok_or_else(|| self.malformed(format!("missing date field `{key}`")))?;
        timestamp::normalize(value)
            .ok_or_else(|| self.malformed(format!("unreadable date field `{key}`")))
    }
}

/// Result of a write that is conditional on another document.
#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    Written(T),
    /// The document the write depends on does not exist.
    Missing,
    /// It exists but does not satisfy the condition. Nothing was written.
    Refused(Document),
}

/// Handle to whichever backend the service was started with.
#[derive(Debug, Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::default())
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        PgStore::connect(database_url, max_connections)
            .await
            .map(Store::Postgres)
    }

    /// Insert a document under a freshly generated id.
    pub async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = new_id();
        self.set(collection, &id, fields).await?;
        Ok(id)
    }

    /// Create or replace a document.
    pub async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        match self {
            Store::Postgres(s) => s.set(collection, id, fields).await,
            Store::Memory(s) => {
                s.set(collection, id, fields).await;
                Ok(())
            }
        }
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        match self {
            Store::Postgres(s) => s.get(collection, id).await,
            Store::Memory(s) => Ok(s.get(collection, id).await),
        }
    }

    /// All documents of one collection, ordered by id.
    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        match self {
            Store::Postgres(s) => s.list(collection).await,
            Store::Memory(s) => Ok(s.list(collection).await),
        }
    }

    /// Documents of one collection whose top-level `field` equals `value`.
    pub async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Store::Postgres(s) => s.query_eq(collection, field, value).await,
            Store::Memory(s) => Ok(s.query_eq(collection, field, value).await),
        }
    }

    /// Like [`Store::query_eq`], across every collection whose last path
    /// segment is `group` (e.g. all `registrations` of all batches).
    pub async fn query_group_eq(
        &self,
        group: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Store::Postgres(s) => s.query_group_eq(group, field, value).await,
            Store::Memory(s) => Ok(s.query_group_eq(group, field, value).await),
        }
    }

    /// Shallow-merge `patch` into an existing document. Returns false when
    /// the document does not exist.
    pub async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<bool, StoreError> {
        match self {
            Store::Postgres(s) => s.update(collection, id, patch).await,
            Store::Memory(s) => Ok(s.update(collection, id, patch).await),
        }
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        match self {
            Store::Postgres(s) => s.delete(collection, id).await,
            Store::Memory(s) => Ok(s.delete(collection, id).await),
        }
    }

    /// Insert a document under a fresh id, but only if the document
    /// `parent_collection/parent_id` exists and its `field` equals
    /// `expected`. Check and insert happen under one lock (one transaction
    /// with the parent row locked on Postgres).
    pub async fn add_if(
        &self,
        parent_collection: &str,
        parent_id: &str,
        field: &str,
        expected: &Value,
        collection: &str,
        fields: Fields,
    ) -> Result<Guarded<String>, StoreError> {
        let id = new_id();
        let outcome = match self {
            Store::Postgres(s) => {
                s.add_if(parent_collection, parent_id, field, expected, collection, &id, fields)
                    .await?
            }
            Store::Memory(s) => {
                s.add_if(parent_collection, parent_id, field, expected, collection, &id, fields)
                    .await
            }
        };
        Ok(match outcome {
            Guarded::Written(()) => Guarded::Written(id),
            Guarded::Missing => Guarded::Missing,
            Guarded::Refused(doc) => Guarded::Refused(doc),
        })
    }

    /// Read-modify-write of one document with no other writer in between.
    /// `None` when the document does not exist; an error from `f` leaves
    /// the document untouched.
    pub async fn modify<T>(
        &self,
        collection: &str,
        id: &str,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        match self {
            Store::Postgres(s) => s.modify(collection, id, f).await,
            Store::Memory(s) => s.modify(collection, id, f).await,
        }
    }

    /// Delete a document together with the given child collections in one
    /// step. Returns how many children were removed, or `None` if the
    /// document does not exist.
    pub async fn delete_cascade(
        &self,
        collection: &str,
        id: &str,
        children: &[String],
    ) -> Result<Option<u64>, StoreError> {
        match self {
            Store::Postgres(s) => s.delete_cascade(collection, id, children).await,
            Store::Memory(s) => Ok(s.delete_cascade(collection, id, children).await),
        }
    }
}

/// Random 20-character hex document id.
pub fn new_id() -> String {
    let bytes: [u8; 10] = rand::rng().random();
    hex::encode(bytes)
}

/// True when `collection` is `group` or ends in `/{group}`.
pub(crate) fn in_group(collection: &str, group: &str) -> bool {
    collection == group
        || collection
            .strip_suffix(group)
            .is_some_and(|prefix| prefix.ends_with('/'))
}
