//! Persisted document storage
//!
//! Settings and history live side by side in one JSON object, under separate
//! top-level keys. A [`DocumentStore`] loads and saves that object whole;
//! [`SharedDocument`] serializes every read-modify-write so two writers never
//! lose each other's keys.

use crate::StateResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

mod file;
mod memory;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

/// The persisted top-level JSON object
pub type Document = Map<String, Value>;

/// Backend that loads and saves the whole document
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the document; a store that has never been written yields an
    /// empty object.
    async fn load(&self) -> StateResult<Document>;

    /// Replace the stored document
    async fn save(&self, document: &Document) -> StateResult<()>;
}

/// Serialized access to a [`DocumentStore`] shared by several owners
///
/// Every write loads the latest document, changes only what the caller
/// touches and saves it back while holding a lock, so keys owned by other
/// components survive.
pub struct SharedDocument {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl SharedDocument {
    /// Wrap a store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the current document
    pub async fn load(&self) -> StateResult<Document> {
        self.store.load().await
    }

    /// Read one top-level key
    pub async fn read_key(&self, key: &str) -> StateResult<Option<Value>> {
        let mut document = self.store.load().await?;
        Ok(document.remove(key))
    }

    /// Apply `mutate` to the latest document and save the result
    pub async fn update<F>(&self, mutate: F) -> StateResult<()>
    where
        F: FnOnce(&mut Document) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await?;
        mutate(&mut document);
        self.store.save(&document).await
    }

    /// Replace one top-level key, leaving every other key as stored
    pub async fn write_key(&self, key: &str, value: Value) -> StateResult<()> {
        trace!(key, "Writing document key");
        self.update(|document| {
            document.insert(key.to_string(), value);
        })
        .await
    }
}

impl std::fmt::Debug for SharedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDocument").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_key_preserves_other_keys() {
        let store = Arc::new(MemoryDocumentStore::with_document(
            json!({"history": {"sessions": []}, "extra": 1}),
        ));
        let document = SharedDocument::new(store.clone());

        document
            .write_key("settings", json!({"activeProfileId": "a"}))
            .await
            .unwrap();

        let stored = store.snapshot().await;
        assert_eq!(
            Value::Object(stored),
            json!({
                "history": {"sessions": []},
                "extra": 1,
                "settings": {"activeProfileId": "a"}
            })
        );
    }

    #[tokio::test]
    async fn test_read_missing_key() {
        let document = SharedDocument::new(Arc::new(MemoryDocumentStore::new()));
        assert_eq!(document.read_key("settings").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_both_keys() {
        let store = Arc::new(MemoryDocumentStore::new());
        let document = Arc::new(SharedDocument::new(store.clone()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let document = document.clone();
            handles.push(tokio::spawn(async move {
                document
                    .write_key(&format!("key-{i}"), json!(i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.snapshot().await.len(), 16);
    }
}
