//! Chat-completions provider implementation
//!
//! Talks to any endpoint implementing OpenAI's `POST /chat/completions`,
//! in single-shot or streaming mode.

use crate::error::api_error;
use crate::http::{create_headers, HttpClient, ReqwestClient};
use crate::openai::{
    config::OpenAIConfig, converter::OpenAIConverter, parser::OpenAIParser, stream::OpenAIStream,
};
use crate::traits::{RequestConverter, ResponseParser};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use synapse_core::{prompt_messages, CompletionProvider, Error, ProviderProfile};
use tracing::{debug, error};

/// Chat-completions client for one configuration snapshot
///
/// # Example
///
/// ```no_run
/// use synapse_providers::http::ReqwestClient;
/// use synapse_providers::openai::{OpenAI, OpenAIConfig};
/// use std::sync::Arc;
///
/// let config = OpenAIConfig::new("sk-...", "https://api.openai.com/v1", "gpt-4o");
/// let client = Arc::new(ReqwestClient::new().expect("Failed to create client"));
/// let provider = OpenAI::new(config, client);
/// ```
#[derive(Clone)]
pub struct OpenAI {
    client: Arc<dyn HttpClient>,
    config: OpenAIConfig,
    converter: OpenAIConverter,
    parser: OpenAIParser,
}

impl OpenAI {
    /// Create a provider with the given configuration and client
    pub fn new(config: OpenAIConfig, client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            converter: OpenAIConverter::new(&config),
            config,
            parser: OpenAIParser,
        }
    }

    /// Create a provider from a profile snapshot
    pub fn from_profile(profile: &ProviderProfile, client: Arc<dyn HttpClient>) -> Result<Self, Error> {
        Ok(Self::new(OpenAIConfig::from_profile(profile)?, client))
    }

    /// Create a provider with the default reqwest client
    pub fn with_default_client(config: OpenAIConfig) -> Result<Self, Error> {
        Ok(Self::new(config, Arc::new(ReqwestClient::new()?)))
    }

    /// The configuration this provider was built from
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn prepare(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<(String, HeaderMap, Value), Error> {
        if self.config.api_key.is_empty() {
            return Err(Error::configuration("API key not configured"));
        }

        let messages = prompt_messages(prompt, system_prompt);
        let body = self.converter.convert_request(&self.config.model, &messages)?;
        let headers = create_headers(&self.config.api_key)?;
        let url = self.config.chat_url();

        debug!(
            url = %url,
            model = %self.config.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        Ok((url, headers, body))
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    type Stream = OpenAIStream;

    async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String, Error> {
        let (url, headers, body) = self.prepare(prompt, system_prompt)?;

        let response = self.client.post(&url, headers, body).await?;
        if !response.is_success() {
            error!(status = response.status, body = %response.body, "Chat completion failed");
            return Err(api_error(response.status, &response.body));
        }

        let value = response
            .json()
            .map_err(|e| Error::protocol(format!("Response is not JSON: {}", e)))?;
        self.parser.parse_response(value)
    }

    async fn stream_complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<Self::Stream, Error> {
        let (url, headers, mut body) = self.prepare(prompt, system_prompt)?;
        body["stream"] = serde_json::json!(true);

        let response = self.client.post_stream(&url, headers, body).await?;
        if !response.is_success() {
            let status = response.status;
            let text = response.text().await?;
            error!(status, body = %text, "Streaming chat completion failed");
            return Err(api_error(status, &text));
        }

        Ok(OpenAIStream::new(response.body))
    }
}
