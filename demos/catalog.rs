use std::error::Error;

use catalog_store::{telemetry, Asset, Brand, Catalog, CatalogConfig, Category, Product};
use futures::StreamExt;
use rust_decimal::Decimal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    telemetry::init();

    let config = CatalogConfig::load().unwrap_or_else(|err| {
        warn!(error = %err, "using default settings");
        CatalogConfig::default()
    });
    let catalog = Catalog::in_memory(&config);

    // Print every snapshot of the product collection as it changes
    let mut feed = catalog.watch::<Product>()?;
    let watcher = tokio::spawn(async move {
        while let Some(snapshot) = feed.next().await {
            match snapshot {
                Ok(products) => {
                    for p in &products {
                        println!("  {:<12} {:>8} {}", p.name, p.price, p.tag.as_deref().unwrap_or("-"));
                    }
                    println!("  ({} products)", products.len());
                }
                Err(err) => warn!(error = %err, "bad snapshot"),
            }
        }
    });

    let brand = catalog
        .brands()
        .create(Brand::new("Acme"), Some(&Asset::new("acme.png", &b"\x89PNG"[..])))
        .await?;
    let category = catalog.categories().create(Category::new("Tools"), None).await?;
    let brand_id = brand.id.clone().unwrap_or_default();
    let category_id = category.id.clone().unwrap_or_default();

    for (name, price, tag) in [("Anvil", "100", "sale"), ("Hammer", "50", "sale"), ("Rope", "100", "new")] {
        let product = Product::new(name, price.parse::<Decimal>()?)
            .with_tag(tag)
            .with_brand(&brand_id)
            .with_category(&category_id);
        catalog.products().create(product, None).await?;
    }

    info!(tags = ?catalog.pricing().list_tags().await?, "tags in use");

    let report = catalog
        .pricing()
        .adjust_prices_by_tag("sale", Decimal::from(10))
        .await?;
    info!(matched = report.matched, batches = report.batches, "sale markup applied");

    for product in catalog.products().list().await? {
        println!("{} -> {}", product.name, product.price);
    }

    catalog.brands().update(brand, Some(&Asset::new("acme-2024.png", &b"\x89PNG"[..]))).await?;
    info!(assets = catalog.objects().len(), "brand logo replaced");

    // Give the watcher a moment to drain, then stop it
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    watcher.abort();
    Ok(())
}
