//! Response parsing for the chat-completions API

use crate::error;
use crate::traits::{ResponseParser, StreamEventParser};
use serde::Deserialize;
use serde_json::Value;
use synapse_core::Error;

/// Parses chat-completions responses and stream chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIParser;

impl ResponseParser for OpenAIParser {
    fn parse_response(&self, value: Value) -> Result<String, Error> {
        let response: CompletionResponse = serde_json::from_value(value)
            .map_err(|e| Error::protocol(format!("Unexpected response shape: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::protocol("No choices in response"))?;

        choice
            .message
            .content
            .ok_or_else(|| Error::protocol("First choice has no message content"))
    }
}

impl StreamEventParser for OpenAIParser {
    fn parse_event(&self, payload: &str) -> Result<Option<String>, Error> {
        let chunk: StreamChunk =
            serde_json::from_str(payload).map_err(error::serialization_error)?;

        Ok(chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content))
    }
}

// Response structures
#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// Streaming structures
#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_first_choice() {
        let value = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
            ]
        });
        assert_eq!(OpenAIParser.parse_response(value).unwrap(), "first");
    }

    #[test]
    fn test_parse_response_shape_mismatch_is_protocol_error() {
        for value in [
            json!({"object": "list"}),
            json!({"choices": []}),
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
            json!("just a string"),
        ] {
            let err = OpenAIParser.parse_response(value.clone()).unwrap_err();
            assert!(matches!(err, Error::Protocol(_)), "{value}");
        }
    }

    #[test]
    fn test_parse_event() {
        let delta = OpenAIParser
            .parse_event(r#"{"id":"c","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#)
            .unwrap();
        assert_eq!(delta.as_deref(), Some("Hi"));

        let usage_only = OpenAIParser
            .parse_event(r#"{"id":"c","choices":[],"usage":{"total_tokens":3}}"#)
            .unwrap();
        assert_eq!(usage_only, None);

        assert!(OpenAIParser.parse_event("{truncated").is_err());
    }
}
