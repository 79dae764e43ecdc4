//! File-backed document store

use super::{Document, DocumentStore};
use crate::{StateError, StateResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

/// Stores the document as pretty-printed JSON in a single file
///
/// Writes go to a sibling temp file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    /// Create a store for the file at `path`. The file and its parent
    /// directories are created on first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn load(&self) -> StateResult<Document> {
        trace!("Loading document from {:?}", self.path);

        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No document at {:?}, starting empty", self.path);
                return Ok(Document::new());
            }
            Err(e) => return Err(e.into()),
        };

        if json.trim().is_empty() {
            return Ok(Document::new());
        }

        match serde_json::from_str::<Value>(&json)? {
            Value::Object(document) => Ok(document),
            other => Err(StateError::invalid_state(format!(
                "document root must be an object, found {}",
                kind_of(&other)
            ))),
        }
    }

    async fn save(&self, document: &Document) -> StateResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;

        debug!("Saved document to {:?}", self.path);
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
