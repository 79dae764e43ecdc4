//! Error types for settings and history persistence

use std::io;
use thiserror::Error;

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Refused to remove the only remaining provider profile
    #[error("Cannot delete the last provider profile")]
    LastProfile,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A change would break a store invariant
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl StateError {
    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

impl From<StateError> for synapse_core::Error {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NotFound(_) | StateError::LastProfile | StateError::InvalidState(_) => {
                synapse_core::Error::Configuration(err.to_string())
            }
            other => synapse_core::Error::Storage(other.to_string()),
        }
    }
}
