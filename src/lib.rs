//! catalog_store - data access and bulk mutation for a product catalog.
//!
//! Brands, categories and products live as documents in a
//! [`DocumentStore`](document::DocumentStore); their images live in an
//! [`ObjectStore`](asset::ObjectStore). [`Catalog`] ties the two together
//! and hands out typed repositories, the tag-scoped [`PriceAdjuster`] and
//! live [`ChangeFeed`]s.

// Lets `#[derive(Document)]` name this crate from inside it.
extern crate self as catalog_store;

pub mod asset;
mod catalog;
pub mod config;
pub mod document;
mod error;
pub mod feed;
pub mod id;
pub mod model;
mod pricing;
mod repository;
pub mod telemetry;

pub use asset::{Asset, AssetAdapter, InMemoryObjectStore, ObjectStore};
pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use document::{Document, DocumentStore, InMemoryDocumentStore, StoreError};
pub use error::{CatalogError, Result};
pub use feed::ChangeFeed;
pub use model::{Brand, Category, Product};
pub use pricing::{adjusted_price, BatchPolicy, PriceAdjuster, PriceAdjustment};
pub use repository::{EntityRepository, NAME_FIELD};

pub use catalog_store_macros::Document;
