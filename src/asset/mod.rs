//! Assets - binary files (images) attached to catalog entities.
//!
//! Asset bytes live in an object store, outside the document store. Entities
//! only keep the durable reference the object store hands back.

mod adapter;
mod in_memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use adapter::{asset_path, AssetAdapter};
pub use in_memory::{InMemoryObjectStore, DEFAULT_BASE_URL};

/// A file to be attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Original filename as supplied by the caller; used to derive the storage path.
    pub file_name: String,
    pub bytes: Bytes,
}

impl Asset {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Abstract binary object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `path`, replacing anything already there, and return
    /// a durable, fetchable reference (URL).
    async fn put(&self, path: &str, bytes: Bytes) -> Result<String, AssetError>;

    /// Remove the object a reference points at. Fails with `NotFound` if absent.
    async fn delete(&self, reference: &str) -> Result<(), AssetError>;
}

/// Error type for object store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The reference does not belong to this object store.
    #[error("unrecognized asset reference: {0}")]
    InvalidReference(String),

    #[error("object store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("object store unavailable: {0}")]
    Unavailable(String),
}
