//! Catalog entity kinds.

mod brand;
mod category;
mod product;

pub use brand::Brand;
pub use category::Category;
pub use product::{fields as product_fields, Product};
