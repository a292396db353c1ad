use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_store_macros::Document;

/// Stored field names the bulk price mutator reads and writes.
pub mod fields {
    pub const TAG: &str = "tag";
    pub const PRICE: &str = "price";
    pub const FINAL_PRICE: &str = "finalPrice";
}

/// A sellable item.
///
/// `category` and `brand` hold ids of documents in the other collections;
/// the store does not enforce them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Document)]
#[document(collection = "products", validate = "Product::check")]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base price.
    pub price: Decimal,
    /// Derived price, written together with `price` by bulk adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Decimal>,
    /// Independent override for distributors; bulk adjustments leave it alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand = Some(brand_id.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category = Some(category_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_distributor_price(mut self, price: Decimal) -> Self {
        self.distributor_price = Some(price);
        self
    }

    fn check(&self) -> Result<(), String> {
        if self.price <= Decimal::ZERO {
            return Err(format!("price must be positive, got {}", self.price));
        }
        if let Some(price) = self.distributor_price {
            if price < Decimal::ZERO {
                return Err(format!("distributor price must not be negative, got {price}"));
            }
        }
        Ok(())
    }
}
