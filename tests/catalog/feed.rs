use std::time::Duration;

use catalog_store::{Brand, Product};
use futures::StreamExt;
use tokio::time::timeout;

use crate::support::{catalog, dec, seed_products};

const WAIT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn first_snapshot_is_current_state() {
    let (catalog, _, _) = catalog();
    catalog.brands().create(Brand::new("Zeta"), None).await.unwrap();
    catalog.brands().create(Brand::new("Alpha"), None).await.unwrap();

    let mut feed = catalog.watch::<Brand>().unwrap();
    let snapshot = timeout(WAIT, feed.next_snapshot())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let names: Vec<_> = snapshot.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
}

#[tokio::test]
async fn emits_full_snapshot_after_each_change() {
    let (catalog, _, _) = catalog();
    let mut feed = catalog.watch::<Brand>().unwrap();
    assert!(timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap().is_empty());

    let acme = catalog.brands().create(Brand::new("Acme"), None).await.unwrap();
    let snapshot = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(snapshot, vec![acme.clone()]);

    catalog.brands().create(Brand::new("Bolt"), None).await.unwrap();
    let snapshot = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(snapshot.len(), 2);

    catalog.brands().delete(&acme).await.unwrap();
    let snapshot = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Bolt");
}

#[tokio::test]
async fn bulk_adjustment_arrives_as_one_snapshot() {
    let (catalog, _, _) = catalog();
    seed_products(&catalog, &[("1", "sale", "100"), ("2", "sale", "50")]).await;
    let mut feed = catalog.watch::<Product>().unwrap();
    timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();

    catalog
        .pricing()
        .adjust_prices_by_tag("sale", dec("10"))
        .await
        .unwrap();

    let snapshot = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    let prices: Vec<_> = snapshot.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![dec("110"), dec("55")]);
}

#[tokio::test]
async fn other_collections_do_not_wake_the_feed() {
    let (catalog, _, _) = catalog();
    let mut feed = catalog.watch::<Brand>().unwrap();
    timeout(WAIT, feed.next()).await.unwrap();

    seed_products(&catalog, &[("1", "sale", "10")]).await;
    assert!(timeout(Duration::from_millis(50), feed.next()).await.is_err());
}

#[tokio::test]
async fn cancel_stops_delivery_and_releases_the_subscription() {
    let (catalog, store, _) = catalog();
    let mut feed = catalog.watch::<Brand>().unwrap();
    assert_eq!(store.subscriber_count("brands"), 1);

    feed.cancel();
    assert!(feed.is_cancelled());
    assert_eq!(store.subscriber_count("brands"), 0);

    catalog.brands().create(Brand::new("Acme"), None).await.unwrap();
    assert!(feed.next().await.is_none());
}

#[tokio::test]
async fn dropping_the_feed_releases_the_subscription() {
    let (catalog, store, _) = catalog();
    let first = catalog.watch::<Brand>().unwrap();
    let second = catalog.watch::<Brand>().unwrap();
    assert_eq!(store.subscriber_count("brands"), 2);

    drop(first);
    assert_eq!(store.subscriber_count("brands"), 1);
    drop(second);
    assert_eq!(store.subscriber_count("brands"), 0);
}

#[tokio::test]
async fn late_subscriber_sees_current_state() {
    let (catalog, _, _) = catalog();
    let early = catalog.watch::<Brand>().unwrap();
    drop(early);

    catalog.brands().create(Brand::new("Acme"), None).await.unwrap();

    let mut late = catalog.watch::<Brand>().unwrap();
    let snapshot = timeout(WAIT, late.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
}
