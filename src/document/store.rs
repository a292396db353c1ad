//! DocumentStore - Abstract access to a collection-oriented document database.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use super::{Fields, RawDocument, StoreError, Write};

/// Live sequence of full collection snapshots.
///
/// Each item is the complete current state of the collection, never a diff.
/// Dropping the stream cancels the subscription.
pub type DocumentStream = BoxStream<'static, Vec<RawDocument>>;

/// Abstract document storage addressed by collection name and document id.
///
/// Per-document writes are atomic; `commit` applies a set of writes across
/// documents as one all-or-nothing unit.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a document by id. Returns None if not found.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>, StoreError>;

    /// Get every document in a collection, optionally ordered ascending by a field.
    async fn get_all(
        &self,
        collection: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<RawDocument>, StoreError>;

    /// Get the documents whose `field` equals `value`.
    async fn get_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<RawDocument>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge fields into an existing document. Fails with `NotFound` if absent.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Returns true if it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// The most writes a single `commit` accepts.
    fn max_batch_writes(&self) -> usize;

    /// Apply writes atomically: either every write lands or none does.
    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError>;

    /// Subscribe to live snapshots of a collection.
    fn subscribe(&self, collection: &str) -> Result<DocumentStream, StoreError>;
}
