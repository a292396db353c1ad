//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::{DocumentStore, DocumentStream, Fields, RawDocument, StoreError, Write};

/// Per-commit write ceiling, matching common managed document databases.
pub const DEFAULT_MAX_BATCH_WRITES: usize = 500;

type Snapshot = Arc<Vec<RawDocument>>;

/// One collection: documents keyed by id plus the channel its subscribers watch.
struct CollectionState {
    docs: BTreeMap<String, Fields>,
    changes: watch::Sender<Snapshot>,
}

impl CollectionState {
    fn new() -> Self {
        let (changes, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            docs: BTreeMap::new(),
            changes,
        }
    }

    fn snapshot(&self) -> Vec<RawDocument> {
        self.docs
            .iter()
            .map(|(id, fields)| RawDocument::new(id.clone(), fields.clone()))
            .collect()
    }

    /// Push the current state to subscribers, if there are any.
    fn publish(&self) {
        if self.changes.receiver_count() > 0 {
            self.changes.send_replace(Arc::new(self.snapshot()));
        }
    }
}

/// In-memory document store backed by a HashMap of collections.
///
/// Clone-friendly via Arc: clones share the same storage, so a test can keep
/// a handle for inspection while the catalog owns another.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<HashMap<String, CollectionState>>>,
    max_batch_writes: usize,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("max_batch_writes", &self.max_batch_writes)
            .finish_non_exhaustive()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty store with the default batch ceiling.
    pub fn new() -> Self {
        Self::with_batch_limit(DEFAULT_MAX_BATCH_WRITES)
    }

    /// Create a new empty store that rejects batches larger than `limit`.
    pub fn with_batch_limit(limit: usize) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            max_batch_writes: limit,
        }
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.storage
            .read()
            .map(|storage| storage.get(collection).map_or(0, |c| c.docs.len()))
            .unwrap_or(0)
    }

    /// Number of live subscriptions on a collection.
    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.storage
            .read()
            .map(|storage| {
                storage
                    .get(collection)
                    .map_or(0, |c| c.changes.receiver_count())
            })
            .unwrap_or(0)
    }

    fn read_collection<T>(
        &self,
        collection: &str,
        read: impl FnOnce(Option<&CollectionState>) -> T,
    ) -> Result<T, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(read(storage.get(collection)))
    }

    fn write_collection<T>(
        &self,
        collection: &str,
        write: impl FnOnce(&mut CollectionState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let state = storage
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);
        let result = write(state)?;
        state.publish();
        Ok(result)
    }
}

/// Ascending order by a field; documents lacking it sort last, ties by id.
fn compare_by_field(a: &RawDocument, b: &RawDocument, field: &str) -> Ordering {
    let ordering = match (a.field(field), b.field(field)) {
        (Some(x), Some(y)) => compare_values(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn merge(target: &mut Fields, fields: Fields) {
    for (key, value) in fields {
        target.insert(key, value);
    }
}

/// Apply one write to a working copy of the affected collections.
fn apply(
    working: &mut HashMap<String, BTreeMap<String, Fields>>,
    write: Write,
) -> Result<(), StoreError> {
    match write {
        Write::Set {
            collection,
            id,
            fields,
        } => {
            working.entry(collection).or_default().insert(id, fields);
        }
        Write::Update {
            collection,
            id,
            fields,
        } => {
            let docs = working.entry(collection.clone()).or_default();
            let target = docs
                .get_mut(&id)
                .ok_or(StoreError::NotFound { collection, id })?;
            merge(target, fields);
        }
        Write::Delete { collection, id } => {
            working.entry(collection).or_default().remove(&id);
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>, StoreError> {
        self.read_collection(collection, |state| {
            state
                .and_then(|c| c.docs.get(id))
                .map(|fields| RawDocument::new(id, fields.clone()))
        })
    }

    async fn get_all(
        &self,
        collection: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<RawDocument>, StoreError> {
        let mut docs = self.read_collection(collection, |state| {
            state.map(CollectionState::snapshot).unwrap_or_default()
        })?;
        if let Some(field) = order_by {
            docs.sort_by(|a, b| compare_by_field(a, b, field));
        }
        Ok(docs)
    }

    async fn get_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<RawDocument>, StoreError> {
        self.read_collection(collection, |state| {
            state
                .map(|c| {
                    c.docs
                        .iter()
                        .filter(|(_, fields)| fields.get(field) == Some(value))
                        .map(|(id, fields)| RawDocument::new(id.clone(), fields.clone()))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.write_collection(collection, |state| {
            state.docs.insert(id.to_string(), fields);
            Ok(())
        })
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.write_collection(collection, |state| {
            let target = state
                .docs
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            merge(target, fields);
            Ok(())
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.write_collection(collection, |state| Ok(state.docs.remove(id).is_some()))
    }

    fn max_batch_writes(&self) -> usize {
        self.max_batch_writes
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        if writes.len() > self.max_batch_writes {
            return Err(StoreError::BatchTooLarge {
                requested: writes.len(),
                limit: self.max_batch_writes,
            });
        }

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("commit"))?;

        // Phase 1: apply to copies of the touched collections
        let mut working: HashMap<String, BTreeMap<String, Fields>> = HashMap::new();
        for write in &writes {
            if !working.contains_key(write.collection()) {
                let docs = storage
                    .get(write.collection())
                    .map(|c| c.docs.clone())
                    .unwrap_or_default();
                working.insert(write.collection().to_string(), docs);
            }
        }
        for write in writes {
            apply(&mut working, write)?;
        }

        // Phase 2: swap the copies in and notify once per collection
        for (collection, docs) in working {
            let state = storage
                .entry(collection)
                .or_insert_with(CollectionState::new);
            state.docs = docs;
            state.publish();
        }

        Ok(())
    }

    fn subscribe(&self, collection: &str) -> Result<DocumentStream, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("subscribe"))?;
        let state = storage
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);

        // Nobody was listening, so the channel may hold a stale snapshot.
        if state.changes.receiver_count() == 0 {
            state.changes.send_replace(Arc::new(state.snapshot()));
        }
        let receiver = state.changes.subscribe();

        Ok(WatchStream::new(receiver)
            .map(|snapshot| snapshot.as_ref().clone())
            .boxed())
    }
}
