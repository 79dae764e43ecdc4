//! Gateway facade over the active provider profile

use async_trait::async_trait;
use std::sync::Arc;
use synapse_core::{CompletionProvider, Error, ProviderProfile, Result};
use synapse_providers::{HttpClient, OpenAI, OpenAIStream};
use synapse_state::SettingsStore;
use tracing::debug;

/// Sends completions through whichever profile is active at call time
///
/// Each call snapshots the active profile when it starts, so settings edits
/// apply to the next call without a restart while a call already in flight
/// keeps the credentials it started with. Every profile kind is served by
/// the OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct Gateway {
    settings: Arc<SettingsStore>,
    http: Arc<dyn HttpClient>,
}

impl Gateway {
    /// Create a gateway reading profiles from `settings`
    pub fn new(settings: Arc<SettingsStore>, http: Arc<dyn HttpClient>) -> Self {
        Self { settings, http }
    }

    /// Snapshot of the profile a call made now would use
    pub async fn active_profile(&self) -> Result<ProviderProfile> {
        self.settings
            .active_profile()
            .await
            .ok_or_else(|| Error::configuration("No active provider profile"))
    }

    async fn provider(&self) -> Result<OpenAI> {
        let profile = self.active_profile().await?;
        debug!(profile = %profile.id, kind = ?profile.kind, "Resolved active profile");
        OpenAI::from_profile(&profile, self.http.clone())
    }
}

#[async_trait]
impl CompletionProvider for Gateway {
    type Stream = OpenAIStream;

    async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        self.provider().await?.complete(prompt, system_prompt).await
    }

    async fn stream_complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<Self::Stream> {
        self.provider()
            .await?
            .stream_complete(prompt, system_prompt)
            .await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use synapse_core::UuidGenerator;
    use synapse_providers::ReqwestClient;
    use synapse_state::{MemoryDocumentStore, SharedDocument};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn gateway_for(server: &MockServer, api_key: &str) -> (Arc<SettingsStore>, Gateway) {
        let store = Arc::new(MemoryDocumentStore::with_document(json!({
            "settings": {
                "profiles": [{
                    "id": "mock",
                    "name": "Mock",
                    "apiKey": api_key,
                    "baseUrl": format!("{}/v1", server.uri()),
                    "models": ["gpt-4o-mini"],
                    "defaultModelId": "gpt-4o-mini"
                }],
                "activeProfileId": "mock"
            }
        })));
        let document = Arc::new(SharedDocument::new(store));
        let settings = Arc::new(SettingsStore::new(document, Arc::new(UuidGenerator)));
        settings.load().await.unwrap();

        let http = Arc::new(ReqwestClient::new().unwrap());
        (settings.clone(), Gateway::new(settings, http))
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
        }))
    }

    #[tokio::test]
    async fn test_key_edits_apply_to_next_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-old"))
            .respond_with(reply("old"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-new"))
            .respond_with(reply("new"))
            .expect(1)
            .mount(&server)
            .await;

        let (settings, gateway) = gateway_for(&server, "sk-old").await;
        assert_eq!(gateway.complete("hi", None).await.unwrap(), "old");

        let mut profile = settings.active_profile().await.unwrap();
        profile.api_key = "sk-new".into();
        settings.upsert_profile(profile).await.unwrap();

        assert_eq!(gateway.complete("hi", None).await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_empty_key_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("unreachable"))
            .expect(0)
            .mount(&server)
            .await;

        let (_, gateway) = gateway_for(&server, "").await;
        let err = gateway.complete("hi", None).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(gateway.stream_complete("hi", None).await.is_err());
    }
}
