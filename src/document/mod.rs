//! Documents - JSON field maps addressed by collection name and id.
//!
//! The document store is an external collaborator; this module defines the
//! narrow contract the catalog needs from it (`DocumentStore`), the atomic
//! multi-document `WriteBatch`, and an in-memory implementation used by
//! tests and demos.
//!
//! ## Example
//!
//! ```ignore
//! use catalog_store::document::{BatchExt, DocumentStore, InMemoryDocumentStore};
//!
//! let store = InMemoryDocumentStore::new();
//! store.set("brands", "b-1", fields).await?;
//!
//! let mut batch = store.batch();
//! batch.update("products", "p-1", price_fields);
//! batch.update("products", "p-2", price_fields);
//! batch.commit().await?;
//! ```

mod batch;
mod in_memory;
mod store;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use batch::{BatchExt, Write, WriteBatch};
pub use in_memory::{InMemoryDocumentStore, DEFAULT_MAX_BATCH_WRITES};
pub use store::{DocumentStore, DocumentStream};

/// Top-level fields of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// Trait for catalog entities persisted as documents.
///
/// Usually derived with `#[derive(Document)]`.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this entity kind lives in (e.g., "brands", "products").
    const COLLECTION: &'static str;

    /// The document id, if one has been assigned.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Display name; listings are ordered by it.
    fn name(&self) -> &str;

    /// Reference to the entity's image in the object store.
    fn image_ref(&self) -> Option<&str>;

    fn set_image_ref(&mut self, reference: Option<String>);

    /// Kind-specific checks run before the entity is first persisted.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A stored document: its key plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub fields: Fields,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode into a typed document. The document key wins when the stored
    /// fields carry no id of their own.
    pub fn decode<D: Document>(&self) -> Result<D, StoreError> {
        let mut doc: D = serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| StoreError::Serde(format!("{}/{}: {}", D::COLLECTION, self.id, e)))?;
        if doc.id().is_none() {
            doc.set_id(self.id.clone());
        }
        Ok(doc)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Serialize a document into top-level fields.
///
/// `None` values the entity skips during serialization are simply absent,
/// which is what gives `DocumentStore::update` its merge semantics.
pub fn encode<D: Document>(doc: &D) -> Result<Fields, StoreError> {
    match serde_json::to_value(doc).map_err(|e| StoreError::Serde(e.to_string()))? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Serde(format!(
            "{} must serialize to an object, got {}",
            D::COLLECTION,
            other
        ))),
    }
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// A merge update targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("document serialization error: {0}")]
    Serde(String),

    /// An atomic batch exceeded the store's per-commit write ceiling.
    #[error("batch of {requested} writes exceeds store limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },

    /// The remote store rejected or could not serve the request.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}
