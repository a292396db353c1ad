//! Bulk price adjustment scoped by product tag.
//!
//! Every product carrying the tag gets `price * (1 + percent / 100)` written
//! to both `price` and `finalPrice` in one atomic batch. Arithmetic is
//! decimal, so repeated adjustments do not drift.
//!
//! ## Example
//!
//! ```ignore
//! let report = catalog.pricing().adjust_prices_by_tag("sale", Decimal::from(10)).await?;
//! assert_eq!(report.batches, 1);
//! ```

use std::collections::BTreeSet;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::PricingConfig;
use crate::document::{BatchExt, Document, DocumentStore, Fields, RawDocument, StoreError};
use crate::error::{CatalogError, Result};
use crate::model::{product_fields, Product};

/// What to do when the tagged set needs more writes than one commit allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Refuse with `BatchTooLarge` before writing anything.
    #[default]
    FailFast,
    /// Commit in store-sized chunks. Each chunk is atomic; the whole is not.
    Chunked,
}

/// Outcome of a bulk adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceAdjustment {
    /// Products that carried the tag and were rewritten.
    pub matched: usize,
    /// Atomic commits issued.
    pub batches: usize,
}

/// `price * (1 + percent / 100)`, optionally rounded half away from zero.
pub fn adjusted_price(price: Decimal, percent: Decimal, decimal_places: Option<u32>) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_add(percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    let adjusted = price.checked_mul(factor)?;
    let adjusted = match decimal_places {
        Some(dp) => adjusted.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => adjusted,
    };
    Some(adjusted.normalize())
}

/// Applies tag-scoped price changes to the product collection.
pub struct PriceAdjuster<'a, S: ?Sized> {
    store: &'a S,
    settings: PricingConfig,
}

impl<'a, S: DocumentStore + ?Sized> PriceAdjuster<'a, S> {
    pub fn new(store: &'a S, settings: PricingConfig) -> Self {
        Self { store, settings }
    }

    /// Writes allowed per commit: the configured ceiling, capped by the store's own.
    pub fn batch_limit(&self) -> usize {
        self.settings
            .max_batch_writes
            .min(self.store.max_batch_writes())
            .max(1)
    }

    /// Raise (positive) or discount (negative) the price of every product
    /// tagged `tag` by `percent`.
    ///
    /// Under the default `FailFast` policy either every matched product is
    /// updated or none is. A percent of zero still rewrites the matched set.
    #[instrument(skip(self), fields(policy = ?self.settings.policy))]
    pub async fn adjust_prices_by_tag(&self, tag: &str, percent: Decimal) -> Result<PriceAdjustment> {
        if tag.trim().is_empty() {
            return Err(CatalogError::invalid("tag must not be empty"));
        }
        if percent <= -Decimal::ONE_HUNDRED {
            return Err(CatalogError::invalid(format!(
                "percent {percent} would make prices non-positive"
            )));
        }

        let matched = self
            .store
            .get_where(
                Product::COLLECTION,
                product_fields::TAG,
                &Value::String(tag.to_string()),
            )
            .await
            .map_err(|e| CatalogError::persistence(Product::COLLECTION, e))?;

        let mut staged = Vec::with_capacity(matched.len());
        for doc in &matched {
            let price = stored_price(doc)?;
            let new_price = adjusted_price(price, percent, self.settings.decimal_places)
                .ok_or_else(|| {
                    CatalogError::invalid(format!(
                        "adjusting {price} by {percent}% overflows for product {}",
                        doc.id
                    ))
                })?;
            if new_price <= Decimal::ZERO {
                return Err(CatalogError::invalid(format!(
                    "adjusting {price} by {percent}% leaves product {} with non-positive price {new_price}",
                    doc.id
                )));
            }
            debug!(id = %doc.id, %price, %new_price, "staging price");
            staged.push((doc.id.clone(), price_fields(new_price)?));
        }

        if staged.is_empty() {
            info!("no products carry the tag");
            return Ok(PriceAdjustment {
                matched: 0,
                batches: 0,
            });
        }

        let limit = self.batch_limit();
        let total = staged.len();
        let batches = match self.settings.policy {
            BatchPolicy::FailFast => {
                if total > limit {
                    warn!(total, limit, "refusing oversized price adjustment");
                    return Err(CatalogError::BatchTooLarge {
                        requested: total,
                        limit,
                    });
                }
                self.commit_chunk(&staged)
                    .await
                    .map_err(|e| CatalogError::persistence(Product::COLLECTION, e))?;
                1
            }
            BatchPolicy::Chunked => {
                let mut committed = 0;
                let mut batches = 0;
                for chunk in staged.chunks(limit) {
                    if let Err(source) = self.commit_chunk(chunk).await {
                        if committed == 0 {
                            return Err(CatalogError::persistence(Product::COLLECTION, source));
                        }
                        warn!(committed, total, error = %source, "chunked price adjustment stopped part way");
                        return Err(CatalogError::PartialAdjustment {
                            committed,
                            total,
                            source,
                        });
                    }
                    committed += chunk.len();
                    batches += 1;
                }
                batches
            }
        };

        info!(matched = total, batches, "prices adjusted");
        Ok(PriceAdjustment {
            matched: total,
            batches,
        })
    }

    /// Distinct non-blank tags across all products.
    ///
    /// Scans the whole collection on every call.
    #[instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<BTreeSet<String>> {
        let docs = self
            .store
            .get_all(Product::COLLECTION, None)
            .await
            .map_err(|e| CatalogError::persistence(Product::COLLECTION, e))?;

        let tags: BTreeSet<String> = docs
            .iter()
            .filter_map(|doc| doc.field(product_fields::TAG).and_then(Value::as_str))
            .filter(|tag| !tag.trim().is_empty())
            .map(str::to_string)
            .collect();
        debug!(products = docs.len(), tags = tags.len(), "collected tags");
        Ok(tags)
    }

    async fn commit_chunk(&self, chunk: &[(String, Fields)]) -> Result<(), StoreError> {
        let mut batch = self.store.batch();
        for (id, fields) in chunk {
            batch.update(Product::COLLECTION, id, fields.clone());
        }
        batch.commit().await
    }
}

fn stored_price(doc: &RawDocument) -> Result<Decimal> {
    let value = doc.field(product_fields::PRICE).cloned().ok_or_else(|| {
        CatalogError::persistence(
            Product::COLLECTION,
            StoreError::Serde(format!("{}/{}: missing price", Product::COLLECTION, doc.id)),
        )
    })?;
    serde_json::from_value(value).map_err(|e| {
        CatalogError::persistence(
            Product::COLLECTION,
            StoreError::Serde(format!("{}/{}: {}", Product::COLLECTION, doc.id, e)),
        )
    })
}

/// `price` and `finalPrice` always move together.
fn price_fields(price: Decimal) -> Result<Fields> {
    let value = serde_json::to_value(price).map_err(|e| {
        CatalogError::persistence(Product::COLLECTION, StoreError::Serde(e.to_string()))
    })?;
    let mut fields = Fields::new();
    fields.insert(product_fields::PRICE.to_string(), value.clone());
    fields.insert(product_fields::FINAL_PRICE.to_string(), value);
    Ok(fields)
}
