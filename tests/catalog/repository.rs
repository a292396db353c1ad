use catalog_store::{Brand, CatalogError, Category, Document, Product};

use crate::support::{catalog, dec, png};

#[tokio::test]
async fn created_entity_shows_up_in_list() {
    let (catalog, _, _) = catalog();
    let brands = catalog.brands();

    let created = brands.create(Brand::new("Acme"), None).await.unwrap();
    let listed = brands.list().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);
    assert_eq!(listed[0].id.as_deref(), Some("doc-1"));
}

#[tokio::test]
async fn list_of_empty_collection_is_empty() {
    let (catalog, _, _) = catalog();
    assert!(catalog.categories().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_sorted_by_name() {
    let (catalog, _, _) = catalog();
    let categories = catalog.categories();
    for name in ["Shoes", "Bags", "Hats"] {
        categories.create(Category::new(name), None).await.unwrap();
    }

    let names: Vec<_> = categories
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Bags", "Hats", "Shoes"]);
}

#[tokio::test]
async fn kinds_live_in_separate_collections() {
    let (catalog, store, _) = catalog();
    catalog.brands().create(Brand::new("Acme"), None).await.unwrap();
    catalog
        .products()
        .create(Product::new("Anvil", dec("99.90")), None)
        .await
        .unwrap();

    assert_eq!(store.len(Brand::COLLECTION), 1);
    assert_eq!(store.len(Product::COLLECTION), 1);
    assert_eq!(store.len(Category::COLLECTION), 0);
}

#[tokio::test]
async fn id_chosen_up_front_is_kept() {
    let (catalog, _, _) = catalog();
    let id = catalog.new_id();

    let brand = catalog
        .brands()
        .create(Brand::new("Acme").with_id(id.clone()), None)
        .await
        .unwrap();

    assert_eq!(brand.id, Some(id.clone()));
    assert!(catalog.brands().get(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn update_merges_without_clearing_other_fields() {
    let (catalog, _, _) = catalog();
    let products = catalog.products();
    let created = products
        .create(
            Product::new("Anvil", dec("10"))
                .with_description("heavy")
                .with_tag("tools"),
            None,
        )
        .await
        .unwrap();

    let mut renamed = Product::new("Big Anvil", dec("12"));
    renamed.id = created.id.clone();
    products.update(renamed, None).await.unwrap();

    let stored = products
        .get(created.id.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Big Anvil");
    assert_eq!(stored.price, dec("12"));
    assert_eq!(stored.description.as_deref(), Some("heavy"));
    assert_eq!(stored.tag.as_deref(), Some("tools"));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (catalog, _, objects) = catalog();
    let brands = catalog.brands();
    let brand = brands
        .create(Brand::new("Acme"), Some(&png("acme.png")))
        .await
        .unwrap();

    assert!(brands.delete(&brand).await.unwrap());
    assert!(!brands.delete(&brand).await.unwrap());
    assert!(brands.list().await.unwrap().is_empty());
    assert!(objects.is_empty());
}

#[tokio::test]
async fn product_validation_rejects_non_positive_price() {
    let (catalog, store, _) = catalog();
    let err = catalog
        .products()
        .create(Product::new("Free lunch", dec("-1")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidArgument(_)));
    assert_eq!(store.len(Product::COLLECTION), 0);
}
