use tracing::{debug, info, warn};

use super::{Asset, ObjectStore};
use crate::error::{CatalogError, Result};

/// Storage path for an asset: `{collection}/{file_name}`.
///
/// Directory components in the supplied filename are dropped. Two uploads
/// with the same filename in the same collection share a path, and the
/// second silently replaces the first.
pub fn asset_path(collection: &str, file_name: &str) -> Result<String> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(CatalogError::invalid(format!(
            "asset filename {file_name:?} has no usable name"
        )));
    }
    Ok(format!("{collection}/{base}"))
}

/// Uploads, replaces and removes entity assets on top of an `ObjectStore`.
pub struct AssetAdapter<'a, O: ?Sized> {
    objects: &'a O,
}

impl<'a, O: ObjectStore + ?Sized> AssetAdapter<'a, O> {
    pub fn new(objects: &'a O) -> Self {
        Self { objects }
    }

    /// Store an asset for a collection and return its durable reference.
    pub async fn upload(&self, collection: &str, asset: &Asset) -> Result<String> {
        let path = asset_path(collection, &asset.file_name)?;
        let reference = self
            .objects
            .put(&path, asset.bytes.clone())
            .await
            .map_err(|source| CatalogError::AssetUpload {
                path: path.clone(),
                source,
            })?;
        info!(%path, %reference, bytes = asset.len(), "asset uploaded");
        Ok(reference)
    }

    /// Remove an asset. Fails with `AssetNotFound` if it is already gone.
    pub async fn delete(&self, reference: &str) -> Result<()> {
        self.objects
            .delete(reference)
            .await
            .map_err(|source| CatalogError::asset_removal(reference, source))?;
        debug!(%reference, "asset deleted");
        Ok(())
    }

    /// Remove an asset as a cleanup step. Failures are logged, never raised.
    /// Returns whether the asset was removed.
    pub async fn discard(&self, reference: &str) -> bool {
        match self.delete(reference).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%reference, error = %err, "asset cleanup failed; continuing");
                false
            }
        }
    }
}
