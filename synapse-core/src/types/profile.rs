//! Provider profiles: named endpoint/key/model configurations

use serde::{Deserialize, Serialize};

/// Base URL used when a profile does not name one
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when a profile does not name one
pub const DEFAULT_MODEL_ID: &str = "gpt-3.5-turbo";

/// Models filled in for a persisted profile that has no `models` field
pub const DEFAULT_PROFILE_MODELS: [&str; 3] = ["gpt-3.5-turbo", "gpt-4", "gpt-4o"];

/// The API family a profile talks to
///
/// Every kind is currently served by the OpenAI-compatible chat-completions
/// client; the kind is kept so profiles round-trip unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI or an OpenAI-compatible endpoint
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    /// Anthropic
    Anthropic,
    /// Anything else speaking the chat-completions protocol
    Custom,
}

/// A named provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    /// Unique, opaque identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// API family
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: ProviderKind,
    /// Bearer token; empty means "not configured"
    #[serde(default)]
    pub api_key: String,
    /// Endpoint base, e.g. `https://api.openai.com/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Ordered set of model identifiers
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Model used for requests; one of `models` when set
    #[serde(default = "default_model_id")]
    pub default_model_id: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_models() -> Vec<String> {
    DEFAULT_PROFILE_MODELS.iter().map(|m| m.to_string()).collect()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

impl ProviderProfile {
    /// Create a profile with an empty key, the default endpoint and a single
    /// default model.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ProviderKind::OpenAI,
            api_key: String::new(),
            base_url: default_base_url(),
            models: vec![default_model_id()],
            default_model_id: default_model_id(),
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the model list; the first model becomes the default
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self.default_model_id = self.models.first().cloned().unwrap_or_default();
        self.normalize();
        self
    }

    /// Whether an API key has been entered
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// The model requests should use: `default_model_id` when set, otherwise
    /// the first listed model.
    pub fn effective_model(&self) -> Option<&str> {
        if !self.default_model_id.is_empty() {
            Some(self.default_model_id.as_str())
        } else {
            self.models.first().map(String::as_str)
        }
    }

    /// Add a model id. Whitespace is trimmed; empty or duplicate ids are
    /// ignored. Returns whether the list changed.
    pub fn add_model(&mut self, model: &str) -> bool {
        let model = model.trim();
        if model.is_empty() || self.models.iter().any(|m| m == model) {
            return false;
        }
        self.models.push(model.to_string());
        if self.default_model_id.is_empty() {
            self.default_model_id = model.to_string();
        }
        true
    }

    /// Remove a model id. When it was the default, the default moves to the
    /// new first model, or becomes empty if none remain.
    pub fn remove_model(&mut self, model: &str) -> bool {
        let before = self.models.len();
        self.models.retain(|m| m != model);
        if self.models.len() == before {
            return false;
        }
        if self.default_model_id == model {
            self.default_model_id = self.models.first().cloned().unwrap_or_default();
        }
        true
    }

    /// Make `model` the default. It must already be listed.
    pub fn set_default_model(&mut self, model: &str) -> bool {
        if self.models.iter().any(|m| m == model) {
            self.default_model_id = model.to_string();
            true
        } else {
            false
        }
    }

    /// Trim model ids, drop empties and duplicates (first occurrence wins) and
    /// point `default_model_id` at a listed model.
    pub fn normalize(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.models.len());
        for model in self.models.drain(..) {
            let model = model.trim().to_string();
            if !model.is_empty() && !seen.contains(&model) {
                seen.push(model);
            }
        }
        self.models = seen;

        if !self.models.contains(&self.default_model_id) {
            self.default_model_id = self.models.first().cloned().unwrap_or_default();
        }
    }
}
