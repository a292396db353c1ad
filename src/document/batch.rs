//! WriteBatch - Stage document writes for a single atomic commit.
//!
//! ## Example
//!
//! ```ignore
//! let mut batch = store.batch();
//! batch
//!     .update("products", "p-1", fields_a)
//!     .update("products", "p-2", fields_b);
//! batch.commit().await?;
//! ```

use super::{DocumentStore, Fields, StoreError};

/// A single staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    Update {
        collection: String,
        id: String,
        fields: Fields,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl Write {
    pub fn collection(&self) -> &str {
        match self {
            Write::Set { collection, .. }
            | Write::Update { collection, .. }
            | Write::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Write::Set { id, .. } | Write::Update { id, .. } | Write::Delete { id, .. } => id,
        }
    }
}

/// Builder collecting writes that are committed together.
pub struct WriteBatch<'a, S: ?Sized> {
    store: &'a S,
    writes: Vec<Write>,
}

impl<'a, S: DocumentStore + ?Sized> WriteBatch<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            writes: vec![],
        }
    }

    /// Stage a create-or-replace.
    pub fn set(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.writes.push(Write::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    /// Stage a merge update of an existing document.
    pub fn update(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.writes.push(Write::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    /// Stage a delete.
    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.writes.push(Write::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Commit every staged write atomically.
    ///
    /// Oversized batches are rejected before reaching the store.
    pub async fn commit(self) -> Result<(), StoreError> {
        if self.writes.is_empty() {
            return Ok(());
        }

        let limit = self.store.max_batch_writes();
        if self.writes.len() > limit {
            return Err(StoreError::BatchTooLarge {
                requested: self.writes.len(),
                limit,
            });
        }

        tracing::debug!(writes = self.writes.len(), "committing write batch");
        self.store.commit(self.writes).await
    }
}

/// Extension trait to start a write batch from any document store.
pub trait BatchExt: DocumentStore {
    fn batch(&self) -> WriteBatch<'_, Self> {
        WriteBatch::new(self)
    }
}

impl<S: DocumentStore + ?Sized> BatchExt for S {}
