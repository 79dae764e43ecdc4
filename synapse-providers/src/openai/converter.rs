//! Request conversion for the chat-completions API

use crate::openai::OpenAIConfig;
use crate::traits::RequestConverter;
use serde_json::{json, Value};
use synapse_core::{Error, Message};

/// Name of the token-limit field for `model`.
///
/// Provider-specific branching: OpenAI's reasoning families (`o1`, `o3`,
/// `o4-mini`, ...) reject `max_tokens` and expect `max_completion_tokens`.
/// Those ids start with the letter `o` followed by a digit.
pub fn token_limit_field(model: &str) -> &'static str {
    let mut chars = model.chars();
    match (chars.next(), chars.next()) {
        (Some('o'), Some(c)) if c.is_ascii_digit() => "max_completion_tokens",
        _ => "max_tokens",
    }
}

/// Converts prompts to the chat-completions request body
#[derive(Debug, Clone, Copy)]
pub struct OpenAIConverter {
    temperature: f64,
    max_tokens: u32,
}

impl OpenAIConverter {
    /// Take sampling settings from a config
    pub fn new(config: &OpenAIConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl RequestConverter for OpenAIConverter {
    fn convert_request(&self, model: &str, messages: &[Message]) -> Result<Value, Error> {
        let mut body = json!({
            "model": model,
            "messages": messages,
            "temperature": self.temperature,
        });
        body[token_limit_field(model)] = json!(self.max_tokens);

        Ok(body)
    }
}
