//! OpenAI client configuration

use crate::constants::{CHAT_COMPLETIONS_PATH, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use synapse_core::{Error, ProviderProfile};

/// Configuration for one chat-completions endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAIConfig {
    /// API key for authentication; empty means not configured
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Model id sent with every request
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Token limit
    pub max_tokens: u32,
}

impl OpenAIConfig {
    /// Create a configuration with the default temperature and token limit
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Snapshot a profile's endpoint, key and effective model
    pub fn from_profile(profile: &ProviderProfile) -> Result<Self, Error> {
        let model = profile.effective_model().ok_or_else(|| {
            Error::configuration(format!("Profile '{}' has no model configured", profile.name))
        })?;

        Ok(Self::new(&profile.api_key, &profile.base_url, model))
    }

    /// Get the URL for chat completions. One trailing slash on the base URL
    /// is dropped.
    pub fn chat_url(&self) -> String {
        let base = self.base_url.strip_suffix('/').unwrap_or(&self.base_url);
        format!("{}{}", base, CHAT_COMPLETIONS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_strips_one_trailing_slash() {
        let config = OpenAIConfig::new("k", "https://api.openai.com/v1/", "gpt-4o");
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");

        let config = OpenAIConfig::new("k", "http://localhost:8080/v1", "gpt-4o");
        assert_eq!(config.chat_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_from_profile_uses_default_model() {
        let profile = ProviderProfile::new("p", "Local")
            .with_api_key("sk-1")
            .with_base_url("http://localhost:1234/v1")
            .with_models(["llama3", "qwen2"]);

        let config = OpenAIConfig::from_profile(&profile).unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.api_key, "sk-1");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_from_profile_without_models_is_configuration_error() {
        let mut profile = ProviderProfile::new("p", "Empty");
        profile.models.clear();
        profile.default_model_id.clear();

        let err = OpenAIConfig::from_profile(&profile).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
