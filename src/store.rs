//! Access to the backend document store
//!
//! Collections are addressed by slash-separated paths
//! (`categories/{key}/hoardings`, `bookings`, ...). The store is reached
//! through the [`DocumentStore`] trait so that the query layer can be driven
//! by a test double instead of a live backend.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

/// A raw, schemaless document as stored by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The backend document identifier
    pub id: String,

    /// The document fields
    pub data: Map<String, Value>,
}

impl Document {
    /// Create a document from an id and its fields
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Interface to the backend document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot fetch of every document in a collection
    async fn list(&self, path: &str) -> Result<Vec<Document>, Error>;

    /// Fetch a single document by id, `None` if it does not exist
    async fn get(&self, path: &str, id: &str) -> Result<Option<Document>, Error>;

    /// Add a document to a collection, returning the assigned id
    async fn add(&self, path: &str, data: Map<String, Value>) -> Result<String, Error>;

    /// Write a document at a caller-chosen id, creating or replacing it
    async fn set(&self, path: &str, id: &str, data: Map<String, Value>) -> Result<(), Error>;

    /// Open a standing subscription to a collection.
    ///
    /// Every delivery is the complete document set for the collection at that
    /// point in time (full-replace, not incremental diffs).
    async fn watch(&self, path: &str) -> Result<DocumentWatch, Error>;
}

/// A live subscription to a collection, delivering full snapshots
pub struct DocumentWatch {
    rx: mpsc::Receiver<Vec<Document>>,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl DocumentWatch {
    /// Assemble a watch from its channel, cancel flag and optional producer
    /// task. Store implementations share the flag with their producer so the
    /// producer can stop early.
    pub fn new(
        rx: mpsc::Receiver<Vec<Document>>,
        cancelled: Arc<AtomicBool>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            rx,
            cancelled,
            task,
        }
    }

    /// Receive the next snapshot.
    ///
    /// Returns `None` once the subscription has been cancelled or the
    /// producer has gone away. Never yields anything after [`cancel`] has
    /// been called, including snapshots that were already buffered.
    ///
    /// [`cancel`]: DocumentWatch::cancel
    pub async fn recv(&mut self) -> Option<Vec<Document>> {
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        self.rx.recv().await
    }

    /// Tear down the subscription. Idempotent and safe to call after the
    /// producer already stopped.
    pub fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.rx.close();
        // Drop snapshots that were queued before the flag flipped.
        while self.rx.try_recv().is_ok() {}
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether the subscription has been torn down
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for DocumentWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Wire shape of a stored document: its id next to the flattened fields
#[derive(Deserialize)]
struct WireDocument {
    id: String,
    #[serde(flatten)]
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct CreatedDocument {
    id: String,
}

/// REST implementation of [`DocumentStore`]
#[derive(Clone)]
pub struct RestDocumentStore {
    url: String,
    key: String,
    client: reqwest::Client,
    options: ClientOptions,
}

impl RestDocumentStore {
    /// Create a new REST document store
    pub fn new(url: &str, key: &str, client: reqwest::Client, options: ClientOptions) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
            options,
        }
    }

    fn collection_url(&self, path: &str) -> String {
        format!("{}/api/v1/documents/{}", self.url, path.trim_matches('/'))
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn list(&self, path: &str) -> Result<Vec<Document>, Error> {
        let docs = Fetch::get(&self.client, &self.collection_url(path))
            .header("apikey", &self.key)
            .execute::<Vec<WireDocument>>()
            .await?;

        Ok(docs
            .into_iter()
            .map(|d| Document::new(d.id, d.data))
            .collect())
    }

    async fn get(&self, path: &str, id: &str) -> Result<Option<Document>, Error> {
        let url = format!("{}/{}", self.collection_url(path), id);
        let result = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .execute::<WireDocument>()
            .await;

        match result {
            Ok(doc) => Ok(Some(Document::new(doc.id, doc.data))),
            Err(Error::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn add(&self, path: &str, data: Map<String, Value>) -> Result<String, Error> {
        let created = Fetch::post(&self.client, &self.collection_url(path))
            .header("apikey", &self.key)
            .json(&Value::Object(data))?
            .execute::<CreatedDocument>()
            .await?;
        Ok(created.id)
    }

    async fn set(&self, path: &str, id: &str, data: Map<String, Value>) -> Result<(), Error> {
        let url = format!("{}/{}", self.collection_url(path), id);
        Fetch::put(&self.client, &url)
            .header("apikey", &self.key)
            .json(&Value::Object(data))?
            .execute::<WireDocument>()
            .await?;
        Ok(())
    }

    async fn watch(&self, path: &str) -> Result<DocumentWatch, Error> {
        let (tx, rx) = mpsc::channel(16);
        let cancelled = Arc::new(AtomicBool::new(false));

        let store = self.clone();
        let watched_path = path.to_string();
        let flag = cancelled.clone();
        let interval = self.options.watch_interval;

        // The backend exposes no push channel over REST, so a watch is an
        // interval poll emitting one full snapshot per round.
        let task = tokio::spawn(async move {
            loop {
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                match store.list(&watched_path).await {
                    Ok(docs) => {
                        if tx.send(docs).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(path = %watched_path, error = %err, "watch poll failed, ending subscription");
                        break;
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });

        Ok(DocumentWatch::new(rx, cancelled, Some(task)))
    }
}
