//! In-memory fake document store for driving the query layer in tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::mpsc;

use adboard_client::error::Error;
use adboard_client::store::{Document, DocumentStore, DocumentWatch};

static TRACING: Once = Once::new();

/// Route crate logs through a test-aware subscriber, once per test binary
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Fake backend: collections held in memory, watches fed by explicit pushes
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    watchers: Mutex<HashMap<String, Vec<mpsc::Sender<Vec<Document>>>>>,
    next_id: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace a collection's contents and notify its watchers with the new
    /// full snapshot, the way the real backend emits on every mutation.
    pub fn set_documents(&self, path: &str, docs: Vec<Document>) {
        self.collections
            .lock()
            .unwrap()
            .insert(path.to_string(), docs.clone());

        let mut watchers = self.watchers.lock().unwrap();
        if let Some(senders) = watchers.get_mut(path) {
            senders.retain(|tx| tx.try_send(docs.clone()).is_ok());
        }
    }

    /// Watch senders currently registered for a path. Dead senders are
    /// pruned on the next emission, not eagerly.
    #[allow(dead_code)]
    pub fn watcher_count(&self, path: &str) -> usize {
        self.watchers.lock().unwrap().get(path).map_or(0, Vec::len)
    }

    fn snapshot(&self, path: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, path: &str) -> Result<Vec<Document>, Error> {
        Ok(self.snapshot(path))
    }

    async fn get(&self, path: &str, id: &str) -> Result<Option<Document>, Error> {
        Ok(self.snapshot(path).into_iter().find(|d| d.id == id))
    }

    async fn add(
        &self,
        path: &str,
        data: serde_json::Map<String, Value>,
    ) -> Result<String, Error> {
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let doc = Document::new(id.clone(), data);

        let docs = {
            let mut collections = self.collections.lock().unwrap();
            let entry = collections.entry(path.to_string()).or_default();
            entry.push(doc);
            entry.clone()
        };

        let mut watchers = self.watchers.lock().unwrap();
        if let Some(senders) = watchers.get_mut(path) {
            senders.retain(|tx| tx.try_send(docs.clone()).is_ok());
        }

        Ok(id)
    }

    async fn set(
        &self,
        path: &str,
        id: &str,
        data: serde_json::Map<String, Value>,
    ) -> Result<(), Error> {
        let docs = {
            let mut collections = self.collections.lock().unwrap();
            let entry = collections.entry(path.to_string()).or_default();
            match entry.iter_mut().find(|d| d.id == id) {
                Some(existing) => existing.data = data,
                None => entry.push(Document::new(id, data)),
            }
            entry.clone()
        };

        let mut watchers = self.watchers.lock().unwrap();
        if let Some(senders) = watchers.get_mut(path) {
            senders.retain(|tx| tx.try_send(docs.clone()).is_ok());
        }

        Ok(())
    }

    async fn watch(&self, path: &str) -> Result<DocumentWatch, Error> {
        let (tx, rx) = mpsc::channel(16);

        // Initial full snapshot, then one per subsequent mutation.
        tx.try_send(self.snapshot(path)).ok();
        self.watchers
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(tx);

        Ok(DocumentWatch::new(rx, Arc::new(AtomicBool::new(false)), None))
    }
}

/// Build a document from an id and a JSON object literal
pub fn doc(id: &str, value: Value) -> Document {
    Document::new(id, value.as_object().expect("object literal").clone())
}
