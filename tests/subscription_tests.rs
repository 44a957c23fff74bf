//! Subscription semantics against the fake backend: teardown, category
//! switching, and the map view's merged feed

mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use adboard_client::catalog::{CatalogClient, Category, CategoryView, MapFeed};
use adboard_client::config::ClientOptions;

use common::{doc, MemoryDocumentStore};

fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: String::new(),
        active: true,
        order: 0,
    }
}

fn catalog(store: Arc<MemoryDocumentStore>) -> CatalogClient {
    CatalogClient::new(store, &ClientOptions::default())
}

#[tokio::test]
async fn snapshots_are_normalized_full_replacements() {
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![
            doc("h1", json!({ "location": "City Center", "Available": "yes", "price": "15000" })),
            doc("h2", json!({ "location": "Market Road", "available": false })),
        ],
    );

    let catalog = catalog(store.clone());
    let mut subscription = catalog
        .subscribe(&category("digital", "Digital Board"))
        .await
        .unwrap();

    let records = subscription.recv().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].available);
    assert_eq!(records[0].price, 15000.0);
    assert_eq!(records[0].category_name, "Digital Board");

    // A mutation delivers the complete new set, not a diff.
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("h3", json!({ "location": "Highway No. 4" }))],
    );
    let records = subscription.recv().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "h3");
}

#[tokio::test]
async fn no_delivery_after_unsubscribe() {
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("h1", json!({ "location": "City Center" }))],
    );

    let catalog = catalog(store.clone());
    let mut subscription = catalog
        .subscribe(&category("digital", "Digital Board"))
        .await
        .unwrap();
    assert_eq!(subscription.recv().await.unwrap().len(), 1);

    subscription.cancel();
    assert!(subscription.is_cancelled());

    // The backend keeps emitting; none of it reaches the subscriber.
    store.set_documents(
        "categories/digital/hoardings",
        vec![
            doc("h1", json!({ "location": "City Center" })),
            doc("h2", json!({ "location": "Market Road" })),
        ],
    );
    assert!(subscription.recv().await.is_none());

    // Cancelling again is a no-op.
    subscription.cancel();
    assert!(subscription.recv().await.is_none());
}

#[tokio::test]
async fn buffered_snapshots_are_dropped_on_cancel() {
    let store = MemoryDocumentStore::new();
    let catalog = catalog(store.clone());
    let mut subscription = catalog
        .subscribe(&category("digital", "Digital Board"))
        .await
        .unwrap();

    // Queue deliveries without consuming them, then cancel.
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("h1", json!({ "location": "A" }))],
    );
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("h2", json!({ "location": "B" }))],
    );
    subscription.cancel();

    assert!(subscription.recv().await.is_none());
}

#[tokio::test]
async fn dropping_subscription_tears_it_down() {
    common::init_tracing();
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("h1", json!({ "location": "City Center" }))],
    );

    let catalog = catalog(store.clone());
    let mut subscription = catalog
        .subscribe(&category("digital", "Digital Board"))
        .await
        .unwrap();
    assert_eq!(subscription.recv().await.unwrap().len(), 1);

    drop(subscription);

    // The next emission finds a closed channel and prunes the watcher
    // instead of delivering.
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("h2", json!({ "location": "Market Road" }))],
    );
    assert_eq!(store.watcher_count("categories/digital/hoardings"), 0);
}

#[tokio::test]
async fn dropping_map_feed_cancels_every_category() {
    common::init_tracing();
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("d1", json!({ "location": "LED Wall" }))],
    );
    store.set_documents(
        "categories/vans/hoardings",
        vec![doc("v1", json!({ "location": "Van Route 7" }))],
    );

    let catalog = catalog(store.clone());
    let categories = [
        category("digital", "Digital Board"),
        category("vans", "Van Promotions"),
    ];
    let mut feed = MapFeed::open(&catalog, &categories).await.unwrap();
    feed.next_update().await.unwrap();
    feed.next_update().await.unwrap();

    drop(feed);
    // Let the per-category tasks observe the cancel and close their watches.
    tokio::time::sleep(Duration::from_millis(50)).await;

    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("d2", json!({ "location": "LED Tower" }))],
    );
    store.set_documents(
        "categories/vans/hoardings",
        vec![doc("v2", json!({ "location": "Van Route 9" }))],
    );
    assert_eq!(store.watcher_count("categories/digital/hoardings"), 0);
    assert_eq!(store.watcher_count("categories/vans/hoardings"), 0);
}

#[tokio::test]
async fn switching_category_clears_state_first() {
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("d1", json!({ "location": "LED Wall" }))],
    );
    store.set_documents(
        "categories/vans/hoardings",
        vec![doc("v1", json!({ "location": "Van Route 7" }))],
    );

    let mut view = CategoryView::new(catalog(store.clone()));

    view.select(&category("digital", "Digital Board")).await.unwrap();
    view.next_update().await.unwrap();
    assert_eq!(view.records()[0].id, "d1");

    // On switch the old records disappear before the new snapshot lands.
    view.select(&category("vans", "Van Promotions")).await.unwrap();
    assert!(view.records().is_empty());

    // A late emission on the old category must not leak into the new view.
    store.set_documents(
        "categories/digital/hoardings",
        vec![
            doc("d1", json!({ "location": "LED Wall" })),
            doc("d2", json!({ "location": "LED Tower" })),
        ],
    );

    let records = view.next_update().await.unwrap().to_vec();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "v1");
    assert_eq!(records[0].category_name, "Van Promotions");

    view.clear();
    assert!(view.records().is_empty());
    assert!(view.next_update().await.is_none());
}

#[tokio::test]
async fn map_feed_merges_by_category_key() {
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("d1", json!({ "location": "LED Wall", "lat": 19.07, "lng": 72.87 }))],
    );
    store.set_documents(
        "categories/vans/hoardings",
        vec![doc("v1", json!({ "location": "Van Route 7" }))],
    );

    let catalog = catalog(store.clone());
    let categories = [
        category("digital", "Digital Board"),
        category("vans", "Van Promotions"),
    ];
    let mut feed = MapFeed::open(&catalog, &categories).await.unwrap();

    // Two initial snapshots, one per category.
    feed.next_update().await.unwrap();
    let merged = feed.next_update().await.unwrap();
    assert_eq!(merged.len(), 2);

    // A new snapshot for one category replaces its records, not appends.
    store.set_documents(
        "categories/digital/hoardings",
        vec![
            doc("d2", json!({ "location": "LED Tower", "lat": 18.52, "lng": 73.85 })),
            doc("d3", json!({ "location": "LED Gate" })),
        ],
    );
    let merged = feed.next_update().await.unwrap();
    assert_eq!(merged.len(), 3);
    assert!(merged.iter().all(|r| r.id != "d1"));

    // Markers exclude records without usable coordinates.
    let markers = feed.markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].id, "d2");
}

#[tokio::test]
async fn map_feed_category_cancellation_is_independent() {
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "categories/digital/hoardings",
        vec![doc("d1", json!({ "location": "LED Wall" }))],
    );
    store.set_documents(
        "categories/vans/hoardings",
        vec![doc("v1", json!({ "location": "Van Route 7" }))],
    );

    let catalog = catalog(store.clone());
    let categories = [
        category("digital", "Digital Board"),
        category("vans", "Van Promotions"),
    ];
    let mut feed = MapFeed::open(&catalog, &categories).await.unwrap();
    feed.next_update().await.unwrap();
    feed.next_update().await.unwrap();

    feed.cancel_category("digital");
    assert_eq!(feed.merged().len(), 1);
    assert_eq!(feed.merged()[0].id, "v1");

    // The surviving category still delivers.
    store.set_documents(
        "categories/vans/hoardings",
        vec![
            doc("v1", json!({ "location": "Van Route 7" })),
            doc("v2", json!({ "location": "Van Route 9" })),
        ],
    );
    let merged = feed.next_update().await.unwrap();
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().all(|r| r.category_name == "Van Promotions"));
}
