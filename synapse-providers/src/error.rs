//! Conversions from transport and provider failures to core errors

use serde_json::Value;
use synapse_core::Error as CoreError;

/// Convert network errors to core errors
pub fn network_error(error: reqwest::Error) -> CoreError {
    CoreError::Network {
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Convert serialization errors to core errors
pub fn serialization_error(error: serde_json::Error) -> CoreError {
    CoreError::Serialization {
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Build an API error from a failed response.
///
/// Uses `error.message` from the provider's JSON error envelope when the body
/// parses and carries a non-empty one, otherwise the raw body text.
pub fn api_error(status: u16, body: &str) -> CoreError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    CoreError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_envelope_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let error = api_error(401, body);
        assert_eq!(error.to_string(), "API error 401: Incorrect API key provided");
    }

    #[test]
    fn test_api_error_falls_back_to_raw_text() {
        let error = api_error(502, "<html>Bad Gateway</html>");
        assert!(matches!(
            error,
            CoreError::Api { status: 502, ref message } if message == "<html>Bad Gateway</html>"
        ));
    }

    #[test]
    fn test_api_error_json_without_message_uses_body() {
        let body = r#"{"detail":"not found"}"#;
        let error = api_error(404, body);
        assert!(matches!(error, CoreError::Api { ref message, .. } if message == body));

        let body = r#"{"error":{"message":""}}"#;
        let error = api_error(500, body);
        assert!(matches!(error, CoreError::Api { ref message, .. } if message == body));
    }
}
