//! Unique identifier generation

use uuid::Uuid;

/// Source of unique string identifiers for sessions, messages and profiles
pub trait IdGenerator: Send + Sync {
    /// Return a fresh identifier, never returned before by this generator
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
