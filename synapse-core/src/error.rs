//! Error types for the Synapse gateway

use std::error::Error as StdError;
use std::fmt;

/// The main error type for gateway operations
///
/// Nothing in this workspace retries on any of these variants; retry policy,
/// if any, belongs to the caller.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Missing API key, no active profile, or an otherwise unusable profile
    Configuration(String),

    /// The provider answered with an HTTP status >= 400
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the provider's error envelope, or the raw body text
        message: String,
    },

    /// A success response did not have the expected shape
    Protocol(String),

    /// Transport-level failures
    Network {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    Serialization {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Persisted document could not be read or written
    Storage(String),
}

impl Error {
    /// Shorthand for a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Shorthand for a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }

    /// HTTP status carried by the error, if it came from the provider
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Api { status, message } => write!(f, "API error {}: {}", status, message),
            Error::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            Error::Network { message, .. } => write!(f, "Network error: {}", message),
            Error::Serialization { message, .. } => write!(f, "Serialization error: {}", message),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Network { source, .. } | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Network {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
