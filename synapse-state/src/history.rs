//! Conversation history store

use crate::store::SharedDocument;
use crate::types::{ChatMessage, ChatSession, HistoryData, DEFAULT_SESSION_TITLE};
use crate::{StateError, StateResult};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use synapse_core::{IdGenerator, Role};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Top-level document key holding the history
pub const HISTORY_KEY: &str = "history";

/// In-memory history plus the clock that stamps it
#[derive(Debug, Clone, Default)]
struct History {
    data: HistoryData,
    last_timestamp: i64,
}

impl History {
    /// Wall-clock milliseconds, forced strictly past the previous stamp
    fn now(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis().max(self.last_timestamp + 1);
        self.last_timestamp = now;
        now
    }

    fn insert_session(&mut self, id: String, title: String) -> ChatSession {
        let now = self.now();
        let session = ChatSession::new(id, title, now);
        self.data.sessions.insert(0, session.clone());
        self.data.active_session_id = Some(session.id.clone());
        session
    }

    /// Point the active id at a real session, creating one if none exist.
    /// Returns whether anything changed.
    fn repair_active(&mut self, ids: &dyn IdGenerator) -> bool {
        if self.data.active_is_valid() {
            return false;
        }

        match self.data.most_recent().map(|s| s.id.clone()) {
            Some(id) => {
                warn!(
                    stale = ?self.data.active_session_id,
                    repaired = %id,
                    "Active session missing, repointing"
                );
                self.data.active_session_id = Some(id);
            }
            None => {
                self.insert_session(ids.next_id(), DEFAULT_SESSION_TITLE.to_string());
            }
        }
        true
    }
}

/// Sessions and messages, written through to the shared document after every
/// change
pub struct HistoryStore {
    document: Arc<SharedDocument>,
    ids: Arc<dyn IdGenerator>,
    history: RwLock<History>,
}

impl HistoryStore {
    /// Create an empty store over `document`. Call
    /// [`initialize`](Self::initialize) to load what is persisted.
    pub fn new(document: Arc<SharedDocument>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            document,
            ids,
            history: RwLock::new(History::default()),
        }
    }

    /// Load persisted history
    ///
    /// Guarantees at least one session and a valid active id afterwards,
    /// persisting only if a repair was needed. Stored history that cannot be
    /// parsed is an error and is left untouched.
    pub async fn initialize(&self) -> StateResult<()> {
        let data = match self.document.read_key(HISTORY_KEY).await? {
            None | Some(Value::Null) => HistoryData::default(),
            Some(value) => serde_json::from_value(value)?,
        };

        let mut history = self.history.write().await;
        let latest = data
            .sessions
            .iter()
            .map(ChatSession::latest_timestamp)
            .max()
            .unwrap_or_default();
        let mut next = History {
            data,
            last_timestamp: history.last_timestamp.max(latest),
        };

        if next.repair_active(self.ids.as_ref()) {
            self.persist(&next.data).await?;
        }

        debug!(sessions = next.data.sessions.len(), "History initialized");
        *history = next;
        Ok(())
    }

    /// Start a session with the placeholder title and make it active
    pub async fn create_session(&self) -> StateResult<ChatSession> {
        self.create_session_with_title(DEFAULT_SESSION_TITLE).await
    }

    /// Start a session with `title` and make it active
    pub async fn create_session_with_title(&self, title: &str) -> StateResult<ChatSession> {
        let id = self.ids.next_id();
        let title = title.to_string();
        self.apply(|history| Some(history.insert_session(id, title)))
            .await?
            .ok_or_else(|| StateError::invalid_state("session was not created"))
    }

    /// All sessions, most recently updated first
    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        self.history.read().await.data.sorted()
    }

    /// Look a session up by id
    pub async fn get_session(&self, id: &str) -> Option<ChatSession> {
        self.history.read().await.data.session(id).cloned()
    }

    /// The active session, if the active id resolves
    pub async fn active_session(&self) -> Option<ChatSession> {
        let history = self.history.read().await;
        history
            .data
            .active_session_id
            .as_deref()
            .and_then(|id| history.data.session(id))
            .cloned()
    }

    /// Id of the active session
    pub async fn active_session_id(&self) -> Option<String> {
        self.history.read().await.data.active_session_id.clone()
    }

    /// Make `id` active. Unknown ids are ignored; returns whether the active
    /// session changed.
    pub async fn set_active_session(&self, id: &str) -> StateResult<bool> {
        let changed = self
            .apply(|history| {
                if history.data.session(id).is_none()
                    || history.data.active_session_id.as_deref() == Some(id)
                {
                    return None;
                }
                history.data.active_session_id = Some(id.to_string());
                Some(())
            })
            .await?;
        Ok(changed.is_some())
    }

    /// Remove a session. Deleting the active session activates the most
    /// recently updated remaining one, or a fresh session if none remain.
    /// Returns whether a session was removed.
    pub async fn delete_session(&self, id: &str) -> StateResult<bool> {
        let ids = self.ids.as_ref();
        let removed = self
            .apply(|history| {
                let index = history.data.sessions.iter().position(|s| s.id == id)?;
                history.data.sessions.remove(index);
                history.repair_active(ids);
                Some(())
            })
            .await?;

        if removed.is_some() {
            debug!(session = %id, "Deleted session");
        }
        Ok(removed.is_some())
    }

    /// Append a message to a session
    ///
    /// Returns `None` when the session does not exist.
    pub async fn add_message(
        &self,
        session_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> StateResult<Option<ChatMessage>> {
        let id = self.ids.next_id();
        let content = content.into();
        self.apply(|history| {
            let timestamp = history.now();
            let session = history.data.session_mut(session_id)?;
            let message = ChatMessage {
                id,
                role,
                content,
                timestamp,
            };
            session.push_message(message.clone());
            Some(message)
        })
        .await
    }

    /// Replace a message's content. Returns false, changing nothing, when
    /// either id is unknown.
    pub async fn update_message_content(
        &self,
        session_id: &str,
        message_id: &str,
        content: impl Into<String>,
    ) -> StateResult<bool> {
        let content = content.into();
        let updated = self
            .apply(|history| {
                let now = history.now();
                let session = history.data.session_mut(session_id)?;
                session.update_message(message_id, content, now).then_some(())
            })
            .await?;
        Ok(updated.is_some())
    }

    /// Run `change` on a copy of the history. `Some` persists and publishes
    /// the copy; `None` discards it.
    async fn apply<T, F>(&self, change: F) -> StateResult<Option<T>>
    where
        F: FnOnce(&mut History) -> Option<T>,
    {
        let mut history = self.history.write().await;
        let mut next = history.clone();
        let Some(output) = change(&mut next) else {
            return Ok(None);
        };

        self.persist(&next.data).await?;
        *history = next;
        Ok(Some(output))
    }

    async fn persist(&self, data: &HistoryData) -> StateResult<()> {
        let value = serde_json::to_value(data)?;
        self.document.write_key(HISTORY_KEY, value).await
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}
