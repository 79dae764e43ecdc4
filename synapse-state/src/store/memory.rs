//! In-memory document store

use super::{Document, DocumentStore};
use crate::StateResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

/// Keeps the document in memory. Data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    document: Arc<RwLock<Document>>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `document`. Anything other than a JSON
    /// object seeds an empty document.
    pub fn with_document(document: Value) -> Self {
        let document = match document {
            Value::Object(map) => map,
            _ => Document::new(),
        };
        Self {
            document: Arc::new(RwLock::new(document)),
        }
    }

    /// Copy of the current document
    pub async fn snapshot(&self) -> Document {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self) -> StateResult<Document> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &Document) -> StateResult<()> {
        trace!(keys = document.len(), "Saving document to memory store");
        *self.document.write().await = document.clone();
        Ok(())
    }
}
