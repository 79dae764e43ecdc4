//! Common traits for provider implementations

use serde_json::Value;
use synapse_core::{Error, Message};

/// Convert a model id and message list to a provider-specific request body
pub trait RequestConverter: Send + Sync {
    /// Build the JSON body for a non-streaming request
    fn convert_request(&self, model: &str, messages: &[Message]) -> Result<Value, Error>;
}

/// Parse a provider-specific success body into the reply text
pub trait ResponseParser: Send + Sync {
    /// Extract the reply text from a parsed response
    fn parse_response(&self, value: Value) -> Result<String, Error>;
}

/// Parse the payload of one streamed event into an optional text fragment
pub trait StreamEventParser: Send + Sync {
    /// Returns `Ok(None)` for events that carry no text
    fn parse_event(&self, payload: &str) -> Result<Option<String>, Error>;
}
