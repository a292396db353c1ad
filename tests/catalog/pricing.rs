use std::collections::BTreeSet;

use catalog_store::config::PricingConfig;
use catalog_store::id::SequentialIds;
use catalog_store::{
    BatchPolicy, Catalog, CatalogConfig, CatalogError, InMemoryDocumentStore, InMemoryObjectStore,
    Product, PriceAdjustment,
};
use rust_decimal::Decimal;

use crate::support::{catalog, catalog_with, dec, seed_products, FaultyDocumentStore};

async fn product<S, O, G>(catalog: &Catalog<S, O, G>, id: &str) -> Product
where
    S: catalog_store::DocumentStore,
    O: catalog_store::ObjectStore,
    G: catalog_store::id::IdGenerator,
{
    catalog.products().get(id).await.unwrap().unwrap()
}

fn config(max_batch_writes: usize, policy: BatchPolicy) -> CatalogConfig {
    CatalogConfig {
        pricing: PricingConfig {
            max_batch_writes,
            policy,
            decimal_places: None,
        },
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn adjusts_only_tagged_products() {
    let (catalog, _, _) = catalog();
    seed_products(&catalog, &[("1", "sale", "100"), ("2", "sale", "50"), ("3", "other", "100")]).await;

    let report = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("10"))
        .await
        .unwrap();
    assert_eq!(report, PriceAdjustment { matched: 2, batches: 1 });

    let one = product(&catalog, "1").await;
    assert_eq!(one.price, dec("110"));
    assert_eq!(one.final_price, Some(dec("110")));

    let two = product(&catalog, "2").await;
    assert_eq!(two.price, dec("55"));
    assert_eq!(two.final_price, Some(dec("55")));

    let three = product(&catalog, "3").await;
    assert_eq!(three.price, dec("100"));
    assert_eq!(three.final_price, None);
}

#[tokio::test]
async fn discount_with_negative_percent() {
    let (catalog, _, _) = catalog();
    seed_products(&catalog, &[("1", "clearance", "80")]).await;

    catalog
        .pricing()
        .adjust_prices_by_tag("clearance", dec("-25"))
        .await
        .unwrap();
    assert_eq!(product(&catalog, "1").await.price, dec("60"));
}

#[tokio::test]
async fn zero_percent_leaves_prices_unchanged() {
    let (catalog, _, _) = catalog();
    seed_products(&catalog, &[("1", "sale", "19.99"), ("2", "sale", "5")]).await;

    let report = catalog
        .pricing()
        .adjust_prices_by_tag("sale", Decimal::ZERO)
        .await
        .unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(product(&catalog, "1").await.price, dec("19.99"));
    assert_eq!(product(&catalog, "2").await.price, dec("5"));
}

#[tokio::test]
async fn unknown_tag_is_a_no_op() {
    let store = FaultyDocumentStore::new(InMemoryDocumentStore::new());
    let catalog = Catalog::with_config(
        store.clone(),
        InMemoryObjectStore::new(),
        SequentialIds::new("doc"),
        CatalogConfig::default(),
    );
    seed_products(&catalog, &[("1", "sale", "10")]).await;

    let report = catalog
        .pricing()
        .adjust_prices_by_tag("nothing", dec("10"))
        .await
        .unwrap();

    assert_eq!(report, PriceAdjustment { matched: 0, batches: 0 });
    assert_eq!(store.commits_seen(), 0);
}

#[tokio::test]
async fn oversized_batch_fails_and_modifies_nothing() {
    let (catalog, _, _) = catalog_with(config(2, BatchPolicy::FailFast));
    seed_products(
        &catalog,
        &[("1", "sale", "10"), ("2", "sale", "20"), ("3", "sale", "30")],
    )
    .await;

    let err = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("50"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::BatchTooLarge { requested: 3, limit: 2 }
    ));
    assert_eq!(product(&catalog, "1").await.price, dec("10"));
    assert_eq!(product(&catalog, "2").await.price, dec("20"));
    assert_eq!(product(&catalog, "3").await.price, dec("30"));
}

#[tokio::test]
async fn store_limit_caps_the_configured_limit() {
    let mut cfg = config(100, BatchPolicy::FailFast);
    cfg.store.max_batch_writes = 1;
    let (catalog, _, _) = catalog_with(cfg);
    seed_products(&catalog, &[("1", "sale", "10"), ("2", "sale", "20")]).await;

    let err = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("10"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::BatchTooLarge { limit: 1, .. }));
}

#[tokio::test]
async fn chunked_policy_commits_in_pieces() {
    let (catalog, _, _) = catalog_with(config(2, BatchPolicy::Chunked));
    seed_products(
        &catalog,
        &[("1", "sale", "10"), ("2", "sale", "20"), ("3", "sale", "30")],
    )
    .await;

    let report = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("10"))
        .await
        .unwrap();

    assert_eq!(report, PriceAdjustment { matched: 3, batches: 2 });
    assert_eq!(product(&catalog, "3").await.price, dec("33"));
}

#[tokio::test]
async fn chunked_failure_reports_what_was_committed() {
    let store = FaultyDocumentStore::new(InMemoryDocumentStore::new());
    let catalog = Catalog::with_config(
        store.clone(),
        InMemoryObjectStore::new(),
        SequentialIds::new("doc"),
        config(2, BatchPolicy::Chunked),
    );
    seed_products(
        &catalog,
        &[("1", "sale", "10"), ("2", "sale", "20"), ("3", "sale", "30")],
    )
    .await;
    store.allow_commits(1);

    let err = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("10"))
        .await
        .unwrap_err();

    match err {
        CatalogError::PartialAdjustment { committed, total, .. } => {
            assert_eq!((committed, total), (2, 3));
        }
        other => panic!("expected PartialAdjustment, got {other:?}"),
    }
    assert_eq!(product(&catalog, "3").await.price, dec("30"));
}

#[tokio::test]
async fn failed_commit_is_a_persistence_error() {
    let store = FaultyDocumentStore::new(InMemoryDocumentStore::new());
    let catalog = Catalog::with_config(
        store.clone(),
        InMemoryObjectStore::new(),
        SequentialIds::new("doc"),
        CatalogConfig::default(),
    );
    seed_products(&catalog, &[("1", "sale", "10")]).await;
    store.allow_commits(0);

    let err = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("10"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Persistence { .. }));
    assert_eq!(product(&catalog, "1").await.price, dec("10"));
}

#[tokio::test]
async fn rejects_blank_tag_and_total_discount() {
    let (catalog, _, _) = catalog();
    let pricing = catalog.pricing();

    assert!(matches!(
        pricing.adjust_prices_by_tag("  ", dec("10")).await,
        Err(CatalogError::InvalidArgument(_))
    ));
    assert!(matches!(
        pricing.adjust_prices_by_tag("sale", dec("-100")).await,
        Err(CatalogError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn configured_rounding_applies() {
    let mut cfg = config(500, BatchPolicy::FailFast);
    cfg.pricing.decimal_places = Some(2);
    let (catalog, _, _) = catalog_with(cfg);
    seed_products(&catalog, &[("1", "sale", "9.99")]).await;

    catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("5"))
        .await
        .unwrap();
    assert_eq!(product(&catalog, "1").await.price, dec("10.49"));
}

#[tokio::test]
async fn rounding_to_zero_is_rejected_and_writes_nothing() {
    let mut cfg = config(500, BatchPolicy::FailFast);
    cfg.pricing.decimal_places = Some(2);
    let (catalog, _, _) = catalog_with(cfg);
    seed_products(&catalog, &[("1", "sale", "10"), ("2", "sale", "0.01")]).await;

    let err = catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("-60"))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidArgument(ref m) if m.contains("product 2")));
    assert_eq!(product(&catalog, "1").await.price, dec("10"));
    let two = product(&catalog, "2").await;
    assert_eq!(two.price, dec("0.01"));
    assert_eq!(two.final_price, None);

    // Still editable through the repository afterwards.
    catalog.products().update(two, None).await.unwrap();
}

#[tokio::test]
async fn list_tags_is_distinct_and_skips_blank() {
    let (catalog, _, _) = catalog();
    seed_products(
        &catalog,
        &[("1", "a", "1"), ("2", "b", "1"), ("3", "a", "1"), ("4", "", "1")],
    )
    .await;
    // A stored empty string is not a tag either.
    let mut blank = Product::new("blank", dec("1")).with_id("5");
    blank.tag = Some(String::new());
    catalog.products().create(blank, None).await.unwrap();

    let tags = catalog.pricing().list_tags().await.unwrap();
    let expected: BTreeSet<String> = ["a", "b"].into_iter().map(String::from).collect();
    assert_eq!(tags, expected);
}

#[tokio::test]
async fn list_tags_on_empty_catalog() {
    let (catalog, _, _) = catalog();
    assert!(catalog.pricing().list_tags().await.unwrap().is_empty());
}
