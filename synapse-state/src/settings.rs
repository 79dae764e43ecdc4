//! Provider profile settings and their store

use crate::migration::{self, LoadedSettings};
use crate::store::SharedDocument;
use crate::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use synapse_core::{IdGenerator, ProviderKind, ProviderProfile, DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Top-level document key holding the settings
pub const SETTINGS_KEY: &str = "settings";

/// Id of the built-in profile
pub const DEFAULT_PROFILE_ID: &str = "default-openai";

/// Name of the built-in profile
pub const DEFAULT_PROFILE_NAME: &str = "Default OpenAI";

/// Models of the built-in profile
pub const DEFAULT_SETTINGS_MODELS: [&str; 4] = ["gpt-3.5-turbo", "gpt-4", "gpt-4o", "gpt-4o-mini"];

/// Name given to profiles created with [`SettingsStore::add_profile`]
pub const NEW_PROFILE_NAME: &str = "New Profile";

/// Prefix of generated profile ids
pub const PROFILE_ID_PREFIX: &str = "provider-";

/// The provider profiles and which one is in use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Configured profiles, ids unique
    #[serde(alias = "providers", default = "default_profiles")]
    pub profiles: Vec<ProviderProfile>,
    /// Id of the profile requests go through
    #[serde(alias = "activeProviderId", default = "default_profile_id")]
    pub active_profile_id: String,
}

fn default_profile() -> ProviderProfile {
    let mut profile = ProviderProfile::new(DEFAULT_PROFILE_ID, DEFAULT_PROFILE_NAME)
        .with_base_url(DEFAULT_BASE_URL);
    profile.kind = ProviderKind::OpenAI;
    profile.models = DEFAULT_SETTINGS_MODELS.iter().map(|m| m.to_string()).collect();
    profile.default_model_id = DEFAULT_MODEL_ID.to_string();
    profile
}

fn default_profiles() -> Vec<ProviderProfile> {
    vec![default_profile()]
}

fn default_profile_id() -> String {
    DEFAULT_PROFILE_ID.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            active_profile_id: default_profile_id(),
        }
    }
}

impl Settings {
    /// The profile `active_profile_id` points at, if any
    pub fn active_profile(&self) -> Option<&ProviderProfile> {
        self.profile(&self.active_profile_id)
    }

    /// Look a profile up by id
    pub fn profile(&self, id: &str) -> Option<&ProviderProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    fn profile_mut(&mut self, id: &str) -> Option<&mut ProviderProfile> {
        self.profiles.iter_mut().find(|p| p.id == id)
    }

    /// Verify the structural invariants: at least one profile, unique ids and
    /// an active id that resolves.
    pub fn check(&self) -> Result<(), String> {
        if self.profiles.is_empty() {
            return Err("settings must contain at least one profile".to_string());
        }

        for (i, profile) in self.profiles.iter().enumerate() {
            if profile.id.is_empty() {
                return Err("profile id must not be empty".to_string());
            }
            if self.profiles[..i].iter().any(|p| p.id == profile.id) {
                return Err(format!("duplicate profile id '{}'", profile.id));
            }
        }

        if self.active_profile().is_none() {
            return Err(format!(
                "active profile '{}' does not exist",
                self.active_profile_id
            ));
        }

        Ok(())
    }
}

/// Shallow update applied by [`SettingsStore::update`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// Replacement profile list
    pub profiles: Option<Vec<ProviderProfile>>,
    /// Replacement active id
    pub active_profile_id: Option<String>,
}

impl SettingsPatch {
    /// Patch that only replaces the profile list
    pub fn profiles(profiles: Vec<ProviderProfile>) -> Self {
        Self {
            profiles: Some(profiles),
            active_profile_id: None,
        }
    }

    /// Patch that only changes the active profile
    pub fn active_profile(id: impl Into<String>) -> Self {
        Self {
            profiles: None,
            active_profile_id: Some(id.into()),
        }
    }
}

/// What happened while loading settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// An outdated layout was migrated and rewritten
    pub migrated: bool,
    /// Validation failed and defaults are in use
    pub validation_error: Option<String>,
}

/// Holds the current [`Settings`] and writes every change through to the
/// shared document
///
/// Until [`load`](Self::load) runs the store holds the default settings.
pub struct SettingsStore {
    document: Arc<SharedDocument>,
    ids: Arc<dyn IdGenerator>,
    settings: RwLock<Settings>,
}

impl SettingsStore {
    /// Create a store over `document`
    pub fn new(document: Arc<SharedDocument>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            document,
            ids,
            settings: RwLock::new(Settings::default()),
        }
    }

    /// Read settings from the document, migrating old layouts
    ///
    /// A migrated layout is written back at once. Validation failures are
    /// reported in the returned [`LoadReport`], not as an error; only storage
    /// failures are errors.
    pub async fn load(&self) -> StateResult<LoadReport> {
        let raw = self.document.load().await?;
        let LoadedSettings {
            settings,
            needs_persist,
            stale_root_keys,
            validation_error,
        } = migration::load_settings(&raw);

        if let Some(reason) = &validation_error {
            warn!(error = %reason, "Invalid settings, using defaults");
        }

        let mut current = self.settings.write().await;
        if needs_persist {
            info!(
                profiles = settings.profiles.len(),
                removed = ?stale_root_keys,
                "Migrating settings to the current layout"
            );
            let value = serde_json::to_value(&settings)?;
            self.document
                .update(move |document| {
                    for key in &stale_root_keys {
                        document.remove(key);
                    }
                    document.insert(SETTINGS_KEY.to_string(), value);
                })
                .await?;
        }
        *current = settings;

        Ok(LoadReport {
            migrated: needs_persist,
            validation_error,
        })
    }

    /// Re-read settings from the document
    pub async fn reload(&self) -> StateResult<LoadReport> {
        self.load().await
    }

    /// Snapshot of the current settings
    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// The active profile, or `None` when the active id matches nothing
    pub async fn active_profile(&self) -> Option<ProviderProfile> {
        self.settings.read().await.active_profile().cloned()
    }

    /// Shallow-merge `patch` over the current settings and persist
    pub async fn update(&self, patch: SettingsPatch) -> StateResult<Settings> {
        self.modify(|settings| {
            if let Some(profiles) = patch.profiles {
                settings.profiles = profiles;
            }
            if let Some(id) = patch.active_profile_id {
                settings.active_profile_id = id;
            }
            for profile in &mut settings.profiles {
                profile.normalize();
            }
            Ok(settings.clone())
        })
        .await
    }

    /// Append a fresh profile and return it
    pub async fn add_profile(&self) -> StateResult<ProviderProfile> {
        let id = format!("{}{}", PROFILE_ID_PREFIX, self.ids.next_id());
        self.modify(|settings| {
            let profile = ProviderProfile::new(id, NEW_PROFILE_NAME);
            settings.profiles.push(profile.clone());
            Ok(profile)
        })
        .await
    }

    /// Replace the profile with the same id, or append it
    pub async fn upsert_profile(&self, mut profile: ProviderProfile) -> StateResult<()> {
        profile.normalize();
        self.modify(|settings| {
            match settings.profile_mut(&profile.id) {
                Some(existing) => *existing = profile,
                None => settings.profiles.push(profile),
            }
            Ok(())
        })
        .await
    }

    /// Delete a profile
    ///
    /// The last profile cannot be deleted. Deleting the active profile makes
    /// the first remaining profile active.
    pub async fn delete_profile(&self, id: &str) -> StateResult<()> {
        self.modify(|settings| {
            let index = settings
                .profiles
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| StateError::not_found(format!("profile '{}'", id)))?;

            if settings.profiles.len() == 1 {
                return Err(StateError::LastProfile);
            }

            settings.profiles.remove(index);
            if settings.active_profile_id == id {
                settings.active_profile_id = settings.profiles[0].id.clone();
                debug!(active = %settings.active_profile_id, "Deleted active profile, repointed");
            }
            Ok(())
        })
        .await
    }

    /// Make the profile with `id` active
    pub async fn set_active_profile(&self, id: &str) -> StateResult<()> {
        self.modify(|settings| {
            if settings.profile(id).is_none() {
                return Err(StateError::not_found(format!("profile '{}'", id)));
            }
            settings.active_profile_id = id.to_string();
            Ok(())
        })
        .await
    }

    /// Set the active profile's default model; it must be one of its models
    pub async fn set_active_model(&self, model: &str) -> StateResult<()> {
        self.modify(|settings| {
            let active = settings.active_profile_id.clone();
            let profile = settings
                .profile_mut(&active)
                .ok_or_else(|| StateError::not_found(format!("profile '{}'", active)))?;
            if !profile.set_default_model(model) {
                return Err(StateError::not_found(format!(
                    "model '{}' in profile '{}'",
                    model, active
                )));
            }
            Ok(())
        })
        .await
    }

    /// Add a model to a profile. Returns whether the list changed.
    pub async fn add_model(&self, profile_id: &str, model: &str) -> StateResult<bool> {
        self.modify(|settings| {
            let profile = settings
                .profile_mut(profile_id)
                .ok_or_else(|| StateError::not_found(format!("profile '{}'", profile_id)))?;
            Ok(profile.add_model(model))
        })
        .await
    }

    /// Remove a model from a profile. Returns whether the list changed.
    pub async fn remove_model(&self, profile_id: &str, model: &str) -> StateResult<bool> {
        self.modify(|settings| {
            let profile = settings
                .profile_mut(profile_id)
                .ok_or_else(|| StateError::not_found(format!("profile '{}'", profile_id)))?;
            Ok(profile.remove_model(model))
        })
        .await
    }

    /// Apply `change` to a copy of the settings, check invariants, persist,
    /// then publish. Nothing changes if any step fails.
    async fn modify<T, F>(&self, change: F) -> StateResult<T>
    where
        F: FnOnce(&mut Settings) -> StateResult<T>,
    {
        let mut current = self.settings.write().await;
        let mut next = current.clone();
        let output = change(&mut next)?;
        next.check().map_err(StateError::InvalidState)?;

        let value = serde_json::to_value(&next)?;
        self.document.write_key(SETTINGS_KEY, value).await?;

        debug!(
            profiles = next.profiles.len(),
            active = %next.active_profile_id,
            "Settings saved"
        );
        *current = next;
        Ok(output)
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}
