//! Settings and conversation history persistence for Synapse
//!
//! Both stores share one persisted JSON document. Each owns a single
//! top-level key (`settings` and `history`) and rewrites only that key,
//! going through a [`SharedDocument`] that serializes the read-modify-write
//! cycles.

pub mod error;
pub mod history;
pub mod migration;
pub mod settings;
pub mod store;
pub mod types;

pub use error::{StateError, StateResult};
pub use history::{HistoryStore, HISTORY_KEY};
pub use settings::{
    LoadReport, Settings, SettingsPatch, SettingsStore, DEFAULT_PROFILE_ID, SETTINGS_KEY,
};
pub use store::{Document, DocumentStore, FileDocumentStore, MemoryDocumentStore, SharedDocument};
pub use types::{ChatMessage, ChatSession, HistoryData, DEFAULT_SESSION_TITLE};
