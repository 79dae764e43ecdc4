//! Constants for the chat-completions client

/// Default OpenAI base URL
pub const OPENAI_DEFAULT_BASE_URL: &str = synapse_core::DEFAULT_BASE_URL;

/// Path appended to a profile's base URL
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Sampling temperature sent with every request
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Token limit sent with every request
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Prefix of significant lines in a streamed response
pub const SSE_DATA_PREFIX: &str = "data: ";

/// Payload that ends a streamed response
pub const SSE_DONE_SENTINEL: &str = "[DONE]";
