//! InMemoryObjectStore - HashMap-backed object store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{AssetError, ObjectStore};

pub const DEFAULT_BASE_URL: &str = "memory://catalog-assets";

/// In-memory object store keyed by path.
///
/// References are `"{base_url}/{path}"`. Clone-friendly via Arc.
#[derive(Clone, Debug)]
pub struct InMemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
    base_url: String,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the bytes a reference points at.
    pub fn fetch(&self, reference: &str) -> Option<Bytes> {
        let path = self.path_of(reference).ok()?;
        self.objects.read().ok()?.get(path).cloned()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.fetch(reference).is_some()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reference_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn path_of<'r>(&self, reference: &'r str) -> Result<&'r str, AssetError> {
        reference
            .strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|path| !path.is_empty())
            .ok_or_else(|| AssetError::InvalidReference(reference.to_string()))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, path: &str, bytes: Bytes) -> Result<String, AssetError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AssetError::LockPoisoned("put"))?;
        objects.insert(path.to_string(), bytes);
        Ok(self.reference_for(path))
    }

    async fn delete(&self, reference: &str) -> Result<(), AssetError> {
        let path = self.path_of(reference)?;
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AssetError::LockPoisoned("delete"))?;
        objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| AssetError::NotFound(reference.to_string()))
    }
}
