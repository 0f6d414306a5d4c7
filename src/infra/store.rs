use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use ulid::Ulid;

/// A record persisted as one JSON document inside a named collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;

    fn assign_id(&mut self, id: String);
}

/// Persistence collaborator keyed by document id.
///
/// Field filters address top-level JSON keys of the serialized document and
/// compare them as strings. Listing methods return documents in insertion
/// order.
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<D>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<D>>;

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<D>>;

    /// Case-insensitive substring match on `field`.
    async fn search_field(&self, field: &str, needle: &str) -> Result<Vec<D>>;

    /// Inserts or replaces the document. A document without an id gets a
    /// fresh one before it is written.
    async fn save(&self, document: D) -> Result<D>;

    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

pub fn new_document_id() -> String {
    Ulid::new().to_string()
}

/// In-process backend. Used for tests and `STORE_BACKEND=memory`.
pub struct MemoryDocumentStore<D> {
    inner: Arc<RwLock<MemoryCollection<D>>>,
}

struct MemoryCollection<D> {
    next_seq: u64,
    by_seq: BTreeMap<u64, D>,
    seq_by_id: HashMap<String, u64>,
}

impl<D> Clone for MemoryDocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> Default for MemoryDocumentStore<D> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryCollection {
                next_seq: 0,
                by_seq: BTreeMap::new(),
                seq_by_id: HashMap::new(),
            })),
        }
    }
}

impl<D: Document> MemoryDocumentStore<D> {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter<F>(&self, field: &str, mut keep: F) -> Result<Vec<D>>
    where
        F: FnMut(&str) -> bool + Send,
    {
        let collection = self.inner.read().await;
        let mut matches = Vec::new();
        for document in collection.by_seq.values() {
            let value = serde_json::to_value(document)?;
            if let Some(Value::String(text)) = value.get(field) {
                if keep(text.as_str()) {
                    matches.push(document.clone());
                }
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for MemoryDocumentStore<D> {
    async fn find_all(&self) -> Result<Vec<D>> {
        let collection = self.inner.read().await;
        Ok(collection.by_seq.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<D>> {
        let collection = self.inner.read().await;
        Ok(collection
            .seq_by_id
            .get(id)
            .and_then(|seq| collection.by_seq.get(seq))
            .cloned())
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<D>> {
        self.filter(field, |text| text == value).await
    }

    async fn search_field(&self, field: &str, needle: &str) -> Result<Vec<D>> {
        let needle = needle.to_lowercase();
        self.filter(field, |text| text.to_lowercase().contains(&needle))
            .await
    }

    async fn save(&self, mut document: D) -> Result<D> {
        let id = match document.id() {
            Some(id) => id.to_string(),
            None => {
                let id = new_document_id();
                document.assign_id(id.clone());
                id
            }
        };

        let mut collection = self.inner.write().await;
        let existing = collection.seq_by_id.get(&id).copied();
        let seq = match existing {
            Some(seq) => seq,
            None => {
                let seq = collection.next_seq;
                collection.next_seq += 1;
                collection.seq_by_id.insert(id, seq);
                seq
            }
        };
        collection.by_seq.insert(seq, document.clone());
        Ok(document)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut collection = self.inner.write().await;
        match collection.seq_by_id.remove(id) {
            Some(seq) => Ok(collection.by_seq.remove(&seq).is_some()),
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
