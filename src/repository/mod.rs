//! EntityRepository - Typed CRUD for one catalog collection, with the
//! lifecycle of the entity's image asset.
//!
//! Ordering contract for assets:
//! - create: upload, then write the document. A failed upload writes nothing.
//! - update: remove the old asset, upload the new one, then merge the document.
//! - delete: remove the asset, then the document.
//!
//! Removing an old asset is best-effort: failures are logged and the
//! operation carries on. An upload that succeeds before a failed document
//! write leaves an orphaned asset, which is logged with its reference.

use std::marker::PhantomData;

use tracing::{debug, info, instrument, warn};

use crate::asset::{Asset, AssetAdapter, ObjectStore};
use crate::document::{encode, Document, DocumentStore};
use crate::error::{CatalogError, Result};
use crate::id::IdGenerator;

/// Field every entity kind is listed by.
pub const NAME_FIELD: &str = "name";

/// Typed repository over the collection of entity kind `E`.
pub struct EntityRepository<'a, S: ?Sized, O: ?Sized, G: ?Sized, E> {
    store: &'a S,
    assets: AssetAdapter<'a, O>,
    ids: &'a G,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, S, O, G, E> EntityRepository<'a, S, O, G, E>
where
    S: DocumentStore + ?Sized,
    O: ObjectStore + ?Sized,
    G: IdGenerator + ?Sized,
    E: Document,
{
    pub fn new(store: &'a S, objects: &'a O, ids: &'a G) -> Self {
        Self {
            store,
            assets: AssetAdapter::new(objects),
            ids,
            _marker: PhantomData,
        }
    }

    /// All entities of this kind, ascending by name. An empty collection
    /// yields an empty list.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn list(&self) -> Result<Vec<E>> {
        let docs = self
            .store
            .get_all(E::COLLECTION, Some(NAME_FIELD))
            .await
            .map_err(|e| CatalogError::persistence(E::COLLECTION, e))?;
        debug!(count = docs.len(), "listed documents");

        docs.iter()
            .map(|doc| {
                doc.decode::<E>()
                    .map_err(|e| CatalogError::persistence(E::COLLECTION, e))
            })
            .collect()
    }

    /// Get one entity by id.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn get(&self, id: &str) -> Result<Option<E>> {
        let doc = self
            .store
            .get(E::COLLECTION, id)
            .await
            .map_err(|e| CatalogError::persistence(E::COLLECTION, e))?;
        doc.map(|doc| doc.decode::<E>())
            .transpose()
            .map_err(|e| CatalogError::persistence(E::COLLECTION, e))
    }

    /// Persist a new entity, uploading its asset first when one is given.
    ///
    /// A pre-assigned id is kept; otherwise a fresh one is generated. The id
    /// is written both as the document key and as a field.
    #[instrument(skip_all, fields(collection = E::COLLECTION))]
    pub async fn create(&self, entity: E, asset: Option<&Asset>) -> Result<E> {
        let mut entity = entity;
        check(&entity)?;

        if let Some(asset) = asset {
            let reference = self.assets.upload(E::COLLECTION, asset).await?;
            entity.set_image_ref(Some(reference));
        }

        let id = match assigned_id(&entity) {
            Some(id) => id.to_string(),
            None => {
                let id = self.ids.new_id();
                entity.set_id(id.clone());
                id
            }
        };

        let fields = encode(&entity).map_err(|e| CatalogError::persistence(E::COLLECTION, e))?;
        if let Err(err) = self.store.set(E::COLLECTION, &id, fields).await {
            if let Some(reference) = entity.image_ref() {
                warn!(%id, %reference, error = %err, "document write failed; uploaded asset is orphaned");
            }
            return Err(CatalogError::persistence(E::COLLECTION, err));
        }

        info!(%id, "created");
        Ok(entity)
    }

    /// Merge an entity's fields into its stored document, replacing its asset
    /// when a new one is given. Fields the entity leaves unset are untouched.
    #[instrument(skip_all, fields(collection = E::COLLECTION))]
    pub async fn update(&self, entity: E, asset: Option<&Asset>) -> Result<E> {
        let mut entity = entity;
        let id = assigned_id(&entity)
            .ok_or_else(|| CatalogError::invalid(format!("{} update requires an id", E::COLLECTION)))?
            .to_string();
        check(&entity)?;

        if let Some(asset) = asset {
            if let Some(old) = entity.image_ref() {
                self.assets.discard(old).await;
            }
            let reference = match self.assets.upload(E::COLLECTION, asset).await {
                Ok(reference) => reference,
                Err(err) => {
                    if let Some(old) = entity.image_ref() {
                        warn!(%id, reference = %old, "upload failed after old asset removal; document still points at it");
                    }
                    return Err(err);
                }
            };
            entity.set_image_ref(Some(reference));
        }

        let fields = encode(&entity).map_err(|e| CatalogError::persistence(E::COLLECTION, e))?;
        if let Err(err) = self.store.update(E::COLLECTION, &id, fields).await {
            if asset.is_some() {
                if let Some(reference) = entity.image_ref() {
                    warn!(%id, %reference, error = %err, "document update failed; uploaded asset is orphaned");
                }
            }
            return Err(CatalogError::persistence(E::COLLECTION, err));
        }

        info!(%id, "updated");
        Ok(entity)
    }

    /// Delete an entity and its asset. Deleting something already gone is
    /// not an error; returns whether the document existed.
    #[instrument(skip_all, fields(collection = E::COLLECTION))]
    pub async fn delete(&self, entity: &E) -> Result<bool> {
        let id = assigned_id(entity)
            .ok_or_else(|| CatalogError::invalid(format!("{} delete requires an id", E::COLLECTION)))?;

        if let Some(reference) = entity.image_ref() {
            self.assets.discard(reference).await;
        }

        let existed = self
            .store
            .delete(E::COLLECTION, id)
            .await
            .map_err(|e| CatalogError::persistence(E::COLLECTION, e))?;

        if existed {
            info!(%id, "deleted");
        } else {
            debug!(%id, "delete of missing document ignored");
        }
        Ok(existed)
    }

    /// Load an entity by id and delete it along with its asset.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        match self.get(id).await? {
            Some(entity) => self.delete(&entity).await,
            None => Ok(false),
        }
    }
}

fn assigned_id<E: Document>(entity: &E) -> Option<&str> {
    entity.id().filter(|id| !id.trim().is_empty())
}

fn check<E: Document>(entity: &E) -> Result<()> {
    if entity.name().trim().is_empty() {
        return Err(CatalogError::invalid(format!(
            "{} name must not be empty",
            E::COLLECTION
        )));
    }
    entity.validate().map_err(CatalogError::InvalidArgument)
}
