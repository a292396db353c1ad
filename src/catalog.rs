//! Catalog - one handle over the document store, the object store and the
//! id source, handing out typed repositories, the price adjuster and change
//! feeds.
//!
//! ## Example
//!
//! ```ignore
//! let catalog = Catalog::in_memory(&CatalogConfig::default());
//!
//! let brand = catalog.brands().create(Brand::new("Acme"), Some(&logo)).await?;
//! let mut feed = catalog.watch::<Brand>()?;
//! let snapshot = feed.next_snapshot().await;
//! ```

use tracing::debug;

use crate::asset::{AssetAdapter, InMemoryObjectStore, ObjectStore};
use crate::config::CatalogConfig;
use crate::document::{Document, DocumentStore, InMemoryDocumentStore};
use crate::error::{CatalogError, Result};
use crate::feed::ChangeFeed;
use crate::id::{IdGenerator, UuidGenerator};
use crate::model::{Brand, Category, Product};
use crate::pricing::PriceAdjuster;
use crate::repository::EntityRepository;

pub struct Catalog<S, O, G = UuidGenerator> {
    store: S,
    objects: O,
    ids: G,
    config: CatalogConfig,
}

impl Catalog<InMemoryDocumentStore, InMemoryObjectStore> {
    /// A catalog backed entirely by process memory.
    pub fn in_memory(config: &CatalogConfig) -> Self {
        Catalog::with_config(
            InMemoryDocumentStore::with_batch_limit(config.store.max_batch_writes),
            InMemoryObjectStore::with_base_url(&config.assets.base_url),
            UuidGenerator,
            config.clone(),
        )
    }
}

impl<S, O> Catalog<S, O>
where
    S: DocumentStore,
    O: ObjectStore,
{
    pub fn new(store: S, objects: O) -> Self {
        Catalog::with_config(store, objects, UuidGenerator, CatalogConfig::default())
    }
}

impl<S, O, G> Catalog<S, O, G>
where
    S: DocumentStore,
    O: ObjectStore,
    G: IdGenerator,
{
    pub fn with_config(store: S, objects: O, ids: G, config: CatalogConfig) -> Self {
        Self {
            store,
            objects,
            ids,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// A fresh id, for callers that want to know it before `create`.
    pub fn new_id(&self) -> String {
        self.ids.new_id()
    }

    pub fn entities<E: Document>(&self) -> EntityRepository<'_, S, O, G, E> {
        EntityRepository::new(&self.store, &self.objects, &self.ids)
    }

    pub fn brands(&self) -> EntityRepository<'_, S, O, G, Brand> {
        self.entities()
    }

    pub fn categories(&self) -> EntityRepository<'_, S, O, G, Category> {
        self.entities()
    }

    pub fn products(&self) -> EntityRepository<'_, S, O, G, Product> {
        self.entities()
    }

    pub fn assets(&self) -> AssetAdapter<'_, O> {
        AssetAdapter::new(&self.objects)
    }

    pub fn pricing(&self) -> PriceAdjuster<'_, S> {
        PriceAdjuster::new(&self.store, self.config.pricing)
    }

    /// Subscribe to live, name-sorted snapshots of `E`'s collection. The
    /// current state arrives first.
    pub fn watch<E: Document>(&self) -> Result<ChangeFeed<E>> {
        let stream = self
            .store
            .subscribe(E::COLLECTION)
            .map_err(|e| CatalogError::persistence(E::COLLECTION, e))?;
        debug!(collection = E::COLLECTION, "change feed opened");
        Ok(ChangeFeed::new(stream))
    }
}

impl<S, O, G> std::fmt::Debug for Catalog<S, O, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
