use thiserror::Error;

use crate::asset::AssetError;
use crate::document::StoreError;

/// Result alias used by every catalog operation.
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// Typed failures surfaced to callers of the catalog.
///
/// Best-effort cleanup steps (removing a stale asset during update or
/// delete) never produce one of these; they are logged and the parent
/// operation continues.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required id or field was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The asset could not be stored. No document was written.
    #[error("asset upload to {path} failed: {source}")]
    AssetUpload {
        path: String,
        #[source]
        source: AssetError,
    },

    /// The referenced asset does not exist in the object store.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// The object store refused to remove an asset for a reason other than
    /// it being absent.
    #[error("asset removal of {reference} failed: {source}")]
    AssetRemoval {
        reference: String,
        #[source]
        source: AssetError,
    },

    /// A document store read or write failed.
    #[error("persistence failure on {collection}: {source}")]
    Persistence {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// A bulk mutation needs more writes than one atomic commit allows.
    #[error("batch of {requested} writes exceeds the atomic commit limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },

    /// A chunked bulk mutation stopped after committing some chunks.
    #[error("bulk update stopped after {committed} of {total} writes: {source}")]
    PartialAdjustment {
        committed: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
}

impl CatalogError {
    pub(crate) fn persistence(collection: &str, source: StoreError) -> Self {
        match source {
            StoreError::BatchTooLarge { requested, limit } => {
                CatalogError::BatchTooLarge { requested, limit }
            }
            source => CatalogError::Persistence {
                collection: collection.to_string(),
                source,
            },
        }
    }

    pub(crate) fn asset_removal(reference: &str, source: AssetError) -> Self {
        match source {
            AssetError::NotFound(reference) => CatalogError::AssetNotFound(reference),
            source => CatalogError::AssetRemoval {
                reference: reference.to_string(),
                source,
            },
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CatalogError::InvalidArgument(message.into())
    }
}
