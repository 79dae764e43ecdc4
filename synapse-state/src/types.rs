//! Conversation history types

use serde::{Deserialize, Serialize};
use synapse_core::Role;

/// Title a session carries until its first user message names it
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Characters of the first user message kept in a derived title
pub const TITLE_MAX_CHARS: usize = 30;

/// Appended to a derived title when the message was cut
pub const TITLE_ELLIPSIS: &str = "...";

/// One message in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: String,
    /// Author
    pub role: Role,
    /// Text, possibly still growing while a reply streams in
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// One conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Messages in insertion order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Creation time in milliseconds
    pub created_at: i64,
    /// Last change in milliseconds
    pub updated_at: i64,
}

impl ChatSession {
    /// Create an empty session
    pub fn new(id: impl Into<String>, title: impl Into<String>, now: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the title is still the placeholder
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_SESSION_TITLE
    }

    /// Append a message and bump `updated_at`. The first user message names
    /// a session that still has the placeholder title.
    pub fn push_message(&mut self, message: ChatMessage) {
        let names_session = message.role == Role::User
            && self.has_default_title()
            && !self.messages.iter().any(|m| m.role == Role::User);
        if names_session {
            self.title = derive_title(&message.content);
        }

        self.updated_at = message.timestamp;
        self.messages.push(message);
    }

    /// Replace a message's content. Returns false when no message has `id`.
    pub fn update_message(&mut self, id: &str, content: impl Into<String>, now: i64) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content = content.into();
                self.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Latest timestamp recorded anywhere in the session
    pub fn latest_timestamp(&self) -> i64 {
        self.messages
            .iter()
            .map(|m| m.timestamp)
            .chain([self.created_at, self.updated_at])
            .max()
            .unwrap_or_default()
    }
}

/// Session title taken from the first characters of a message
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let mut title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        title.push_str(TITLE_ELLIPSIS);
    }
    title
}

/// Persisted history shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    /// Sessions, newest first as created
    #[serde(default)]
    pub sessions: Vec<ChatSession>,
    /// Session shown to the user
    #[serde(default)]
    pub active_session_id: Option<String>,
}

impl HistoryData {
    /// Look a session up by id
    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Mutable lookup by id
    pub fn session_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// The session with the greatest `updated_at`; the earliest in storage
    /// order wins a tie.
    pub fn most_recent(&self) -> Option<&ChatSession> {
        self.sessions
            .iter()
            .reduce(|best, s| if s.updated_at > best.updated_at { s } else { best })
    }

    /// Sessions ordered by `updated_at`, newest first
    pub fn sorted(&self) -> Vec<ChatSession> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// Whether the active id names an existing session
    pub fn active_is_valid(&self) -> bool {
        self.active_session_id
            .as_deref()
            .is_some_and(|id| self.session(id).is_some())
    }
}
