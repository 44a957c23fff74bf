//! Category and map query layer
//!
//! Resolves human-facing category slugs to backend collections, fetches or
//! subscribes to their hoarding documents, and republishes normalized
//! full-replace snapshots to callers. Hoardings live in per-category
//! sub-collections: `categories/{key}/hoardings`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};

use crate::config::ClientOptions;
use crate::error::Error;
use crate::normalize::{normalize_hoarding, HoardingRecord};
use crate::store::{Document, DocumentStore, DocumentWatch};

/// A hoarding category
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// The backend document key
    pub id: String,

    /// Display name; falls back to the key when the document has none
    pub name: String,

    /// Icon identifier for presentation
    pub icon: String,

    /// Only active categories are shown to users
    pub active: bool,

    /// Display sequence, ascending; ties keep arrival order
    pub order: i64,
}

impl Category {
    /// Build a category from its raw document, tolerating missing fields
    pub fn from_document(doc: &Document) -> Self {
        let name = doc
            .data
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&doc.id)
            .to_string();

        Self {
            id: doc.id.clone(),
            name,
            icon: doc
                .data
                .get("icon")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            active: doc.data.get("active").and_then(Value::as_bool).unwrap_or(true),
            order: doc.data.get("order").and_then(Value::as_i64).unwrap_or(0),
        }
    }
}

/// URL-style slug for a category name or key: lowercase, whitespace runs
/// collapsed to single hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Client for the category catalog and its hoarding sub-collections
#[derive(Clone)]
pub struct CatalogClient {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl CatalogClient {
    /// Create a new catalog client over an injected document store
    pub fn new(store: Arc<dyn DocumentStore>, options: &ClientOptions) -> Self {
        Self {
            store,
            collection: options.categories_collection.clone(),
        }
    }

    fn hoardings_path(&self, category_id: &str) -> String {
        format!("{}/{}/hoardings", self.collection, category_id)
    }

    /// List the categories shown to users: active only, ordered ascending by
    /// `order` with ties broken by arrival order.
    pub async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        let docs = self.store.list(&self.collection).await?;
        let mut categories: Vec<Category> = docs
            .iter()
            .map(Category::from_document)
            .filter(|c| c.active)
            .collect();
        categories.sort_by_key(|c| c.order);
        Ok(categories)
    }

    /// Resolve a URL slug to its category.
    ///
    /// Scans the active category list comparing the slugified display name
    /// and the slugified raw key; the first match wins. No match is a
    /// [`Error::NotFound`] the caller surfaces as a not-found page, never a
    /// crash.
    pub async fn resolve_slug(&self, slug: &str) -> Result<Category, Error> {
        for category in self.list_categories().await? {
            if slugify(&category.name) == slug || slugify(&category.id) == slug {
                return Ok(category);
            }
        }
        Err(Error::not_found(format!("category '{}' not found", slug)))
    }

    /// Create a category, enforcing slug uniqueness at write time.
    ///
    /// Two categories whose names collapse to the same slug would make slug
    /// resolution order-dependent, so the collision is rejected here instead
    /// of being resolved at read time.
    pub async fn create_category(
        &self,
        name: &str,
        icon: &str,
        order: i64,
    ) -> Result<String, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }

        let slug = slugify(name);
        // Inactive categories still occupy their slug.
        for doc in self.store.list(&self.collection).await? {
            let existing = Category::from_document(&doc);
            if slugify(&existing.name) == slug || slugify(&existing.id) == slug {
                return Err(Error::validation(format!(
                    "a category with slug '{}' already exists",
                    slug
                )));
            }
        }

        let mut data = Map::new();
        data.insert("name".to_string(), Value::String(name.to_string()));
        data.insert("icon".to_string(), Value::String(icon.to_string()));
        data.insert("active".to_string(), Value::Bool(true));
        data.insert("order".to_string(), Value::from(order));
        self.store.add(&self.collection, data).await
    }

    /// One-shot fetch of a category's hoardings, normalized
    pub async fn fetch_hoardings(
        &self,
        category: &Category,
    ) -> Result<Vec<HoardingRecord>, Error> {
        let docs = self.store.list(&self.hoardings_path(&category.id)).await?;
        Ok(docs
            .iter()
            .map(|d| normalize_hoarding(&d.data, &d.id, &category.name))
            .collect())
    }

    /// Fetch a single hoarding under a category by id
    pub async fn fetch_hoarding(
        &self,
        category: &Category,
        id: &str,
    ) -> Result<HoardingRecord, Error> {
        match self.store.get(&self.hoardings_path(&category.id), id).await? {
            Some(doc) => Ok(normalize_hoarding(&doc.data, &doc.id, &category.name)),
            None => Err(Error::not_found(format!(
                "hoarding '{}' not found under category '{}'",
                id, category.name
            ))),
        }
    }

    /// Open a live subscription to a category's hoardings.
    ///
    /// Every delivery is the complete normalized set for the category at that
    /// point in time (full-replace, not incremental diffs).
    pub async fn subscribe(&self, category: &Category) -> Result<CategorySubscription, Error> {
        let watch = self.store.watch(&self.hoardings_path(&category.id)).await?;
        Ok(CategorySubscription {
            category: category.clone(),
            watch,
        })
    }
}

/// A live subscription to one category's hoardings
pub struct CategorySubscription {
    category: Category,
    watch: DocumentWatch,
}

impl CategorySubscription {
    /// The category this subscription covers
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Receive the next full snapshot, normalized.
    ///
    /// Returns `None` once the subscription was cancelled or the backend
    /// stream ended; nothing is ever delivered after [`cancel`].
    ///
    /// [`cancel`]: CategorySubscription::cancel
    pub async fn recv(&mut self) -> Option<Vec<HoardingRecord>> {
        let docs = self.watch.recv().await?;
        Some(
            docs.iter()
                .map(|d| normalize_hoarding(&d.data, &d.id, &self.category.name))
                .collect(),
        )
    }

    /// Tear down the subscription. Idempotent.
    pub fn cancel(&mut self) {
        self.watch.cancel();
    }

    /// Whether the subscription has been torn down
    pub fn is_cancelled(&self) -> bool {
        self.watch.is_cancelled()
    }
}

/// View state for a single selected category.
///
/// Owns the record set for the selection; switching categories clears the
/// displayed records before the new subscription starts, so stale records are
/// never shown under the new category's header.
pub struct CategoryView {
    catalog: CatalogClient,
    records: Vec<HoardingRecord>,
    subscription: Option<CategorySubscription>,
}

impl CategoryView {
    /// Create an empty view
    pub fn new(catalog: CatalogClient) -> Self {
        Self {
            catalog,
            records: Vec::new(),
            subscription: None,
        }
    }

    /// Switch the view to a category: cancel the previous listener, clear
    /// state, then subscribe.
    pub async fn select(&mut self, category: &Category) -> Result<(), Error> {
        // Cancel before clearing so a slow teardown cannot deliver a stale
        // snapshot into the new selection.
        if let Some(mut old) = self.subscription.take() {
            old.cancel();
        }
        self.records.clear();
        self.subscription = Some(self.catalog.subscribe(category).await?);
        Ok(())
    }

    /// Deselect: tear down the subscription and clear state
    pub fn clear(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.cancel();
        }
        self.records.clear();
    }

    /// Wait for the next snapshot and replace the record set wholesale.
    ///
    /// Returns `None` when nothing is selected or the stream ended.
    pub async fn next_update(&mut self) -> Option<&[HoardingRecord]> {
        let subscription = self.subscription.as_mut()?;
        let records = subscription.recv().await?;
        self.records = records;
        Some(&self.records)
    }

    /// The current record set
    pub fn records(&self) -> &[HoardingRecord] {
        &self.records
    }
}

/// Aggregated live feed over many categories, for the map view.
///
/// Each category keeps its own independently cancellable subscription; their
/// last-known result sets are merged replace-by-key into one combined
/// snapshot on every delivery.
pub struct MapFeed {
    rx: mpsc::Receiver<(String, Vec<HoardingRecord>)>,
    cancels: HashMap<String, oneshot::Sender<()>>,
    results: BTreeMap<String, Vec<HoardingRecord>>,
}

impl MapFeed {
    /// Subscribe to every given category
    pub async fn open(
        catalog: &CatalogClient,
        categories: &[Category],
    ) -> Result<Self, Error> {
        let (tx, rx) = mpsc::channel(16);
        let mut cancels = HashMap::new();

        for category in categories {
            let mut subscription = catalog.subscribe(category).await?;
            let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
            let tx = tx.clone();
            let key = category.id.clone();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = &mut cancel_rx => {
                            subscription.cancel();
                            break;
                        }
                        snapshot = subscription.recv() => match snapshot {
                            Some(records) => {
                                if tx.send((key.clone(), records)).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                tracing::debug!(category = %key, "category feed ended");
                                break;
                            }
                        }
                    }
                }
            });

            cancels.insert(category.id.clone(), cancel_tx);
        }

        // Only the per-category tasks hold senders now; the feed ends once
        // every task is gone.
        drop(tx);

        Ok(Self {
            rx,
            cancels,
            results: BTreeMap::new(),
        })
    }

    /// Wait for the next per-category delivery and return the merged
    /// combined snapshot. Returns `None` once every category stream ended.
    pub async fn next_update(&mut self) -> Option<Vec<HoardingRecord>> {
        loop {
            let (key, records) = self.rx.recv().await?;
            // Deliveries already queued when a category was cancelled are
            // discarded rather than resurrecting its records.
            if !self.cancels.contains_key(&key) {
                continue;
            }
            self.results.insert(key, records);
            return Some(self.merged());
        }
    }

    /// The combined record set across all categories, in category-key order
    pub fn merged(&self) -> Vec<HoardingRecord> {
        self.results.values().flatten().cloned().collect()
    }

    /// Records usable as map markers: combined set minus anything without
    /// finite coordinates (those stay in list views, just not on the map)
    pub fn markers(&self) -> Vec<HoardingRecord> {
        self.results
            .values()
            .flatten()
            .filter(|r| r.has_coordinates())
            .cloned()
            .collect()
    }

    /// Cancel one category's subscription without affecting the others
    pub fn cancel_category(&mut self, category_id: &str) {
        if let Some(cancel) = self.cancels.remove(category_id) {
            let _ = cancel.send(());
        }
        self.results.remove(category_id);
    }

    /// Cancel every subscription
    pub fn cancel_all(&mut self) {
        for (_, cancel) in self.cancels.drain() {
            let _ = cancel.send(());
        }
        self.results.clear();
    }
}

impl Drop for MapFeed {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category_doc(id: &str, value: Value) -> Document {
        Document::new(id, value.as_object().unwrap().clone())
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("Digital Board"), "digital-board");
        assert_eq!(slugify("Shop light and  without light boards"), "shop-light-and-without-light-boards");
        assert_eq!(slugify("Hording"), "hording");
    }

    #[test]
    fn category_defaults_for_sparse_documents() {
        let doc = category_doc("Van Promotions", json!({}));
        let category = Category::from_document(&doc);
        assert_eq!(category.name, "Van Promotions");
        assert!(category.active);
        assert_eq!(category.order, 0);
        assert_eq!(category.icon, "");
    }

    #[test]
    fn category_reads_explicit_fields() {
        let doc = category_doc(
            "digital",
            json!({ "name": "Digital Board", "icon": "led", "active": false, "order": 3 }),
        );
        let category = Category::from_document(&doc);
        assert_eq!(category.name, "Digital Board");
        assert_eq!(category.icon, "led");
        assert!(!category.active);
        assert_eq!(category.order, 3);
    }
}
