//! Settings migration chain
//!
//! Persisted settings have gone through three layouts:
//!
//! 1. [`SettingsLayout::Legacy`]: a single flat profile (`openAIApiKey` or
//!    `apiKey`, `openAIBaseUrl` or `baseUrl`, `modelName`) with no profile
//!    list, either at the document root or under the `settings` key.
//! 2. [`SettingsLayout::RootLevel`]: the multi-profile shape written directly
//!    at the document root (`providers`/`profiles` + active id).
//! 3. [`SettingsLayout::Keyed`]: the multi-profile shape under `settings`.
//!
//! Each step is a pure function: [`detect_layout`] classifies the raw
//! document, [`migrate_legacy`] lifts a flat profile into [`Settings`],
//! [`validate`] parses the current shape (serde fills missing fields with
//! defaults) and repairs what can be repaired. [`load_settings`] runs the
//! chain and never fails; a document that cannot be validated yields the
//! default settings plus the reason.

use crate::settings::{Settings, DEFAULT_PROFILE_ID, DEFAULT_PROFILE_NAME, SETTINGS_KEY};
use crate::store::Document;
use serde_json::Value;
use synapse_core::{ProviderKind, ProviderProfile, DEFAULT_BASE_URL, DEFAULT_MODEL_ID};

/// Flat API key fields, newest spelling last
pub const LEGACY_API_KEY_FIELDS: [&str; 2] = ["openAIApiKey", "apiKey"];

/// Flat base URL fields
pub const LEGACY_BASE_URL_FIELDS: [&str; 2] = ["openAIBaseUrl", "baseUrl"];

/// Flat model field
pub const LEGACY_MODEL_FIELD: &str = "modelName";

/// Keys that may hold a profile list
const PROFILE_LIST_FIELDS: [&str; 2] = ["profiles", "providers"];

/// Keys that may hold the active profile id
const ACTIVE_ID_FIELDS: [&str; 2] = ["activeProfileId", "activeProviderId"];

/// Models seeded into a migrated flat profile after its own model
const LEGACY_EXTRA_MODELS: [&str; 2] = ["gpt-4", "gpt-4o"];

/// Fields of the single-profile layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacySettings {
    /// API key, empty when absent
    pub api_key: String,
    /// Base URL if one was stored
    pub base_url: Option<String>,
    /// Model name if one was stored
    pub model_name: Option<String>,
}

/// How settings are laid out in a raw document
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsLayout {
    /// Nothing stored yet
    Empty,
    /// Flat single-profile fields
    Legacy {
        /// Extracted fields
        settings: LegacySettings,
        /// Whether the fields sit at the document root
        at_root: bool,
    },
    /// Multi-profile fields at the document root
    RootLevel(Value),
    /// Multi-profile fields under the `settings` key
    Keyed(Value),
}

/// Outcome of running the migration chain
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    /// The settings to use
    pub settings: Settings,
    /// Whether the stored layout is outdated and should be rewritten
    pub needs_persist: bool,
    /// Top-level keys to remove when rewriting
    pub stale_root_keys: Vec<String>,
    /// Why validation failed, when defaults were substituted
    pub validation_error: Option<String>,
}

/// Classify the settings layout of a raw document
pub fn detect_layout(document: &Document) -> SettingsLayout {
    if let Some(Value::Object(keyed)) = document.get(SETTINGS_KEY) {
        if let Some(settings) = legacy_fields(keyed) {
            return SettingsLayout::Legacy {
                settings,
                at_root: false,
            };
        }
        return SettingsLayout::Keyed(Value::Object(keyed.clone()));
    }

    if let Some(settings) = legacy_fields(document) {
        return SettingsLayout::Legacy {
            settings,
            at_root: true,
        };
    }

    if has_any(document, &PROFILE_LIST_FIELDS) {
        let root: Document = document
            .iter()
            .filter(|(key, _)| is_root_settings_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        return SettingsLayout::RootLevel(Value::Object(root));
    }

    match document.get(SETTINGS_KEY) {
        Some(value) => SettingsLayout::Keyed(value.clone()),
        None => SettingsLayout::Empty,
    }
}

/// Lift a flat single profile into multi-profile settings
///
/// The profile gets the well-known default id so the active pointer resolves.
/// Its model list starts with the stored model, followed by the stock models.
pub fn migrate_legacy(legacy: &LegacySettings) -> Settings {
    let model = legacy
        .model_name
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MODEL_ID)
        .to_string();

    let base_url = legacy
        .base_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);

    let mut models = vec![model.clone()];
    models.extend(LEGACY_EXTRA_MODELS.iter().map(|m| m.to_string()));

    let mut profile = ProviderProfile::new(DEFAULT_PROFILE_ID, DEFAULT_PROFILE_NAME)
        .with_api_key(legacy.api_key.clone())
        .with_base_url(base_url);
    profile.kind = ProviderKind::OpenAI;
    profile.models = models;
    profile.default_model_id = model;
    profile.normalize();

    Settings {
        active_profile_id: profile.id.clone(),
        profiles: vec![profile],
    }
}

/// Parse and repair the current multi-profile shape
///
/// Missing fields take their defaults. Model lists are normalized and an
/// active id that matches no profile is pointed at the first profile.
/// Structural problems (wrong types, no profiles, duplicate ids) are errors.
pub fn validate(value: Value) -> Result<Settings, String> {
    let mut settings: Settings = serde_json::from_value(value).map_err(|e| e.to_string())?;

    for profile in &mut settings.profiles {
        profile.normalize();
    }

    if settings.active_profile().is_none() {
        if let Some(first) = settings.profiles.first() {
            tracing::warn!(
                active = %settings.active_profile_id,
                repaired = %first.id,
                "Active profile id matches no profile, repointing"
            );
            settings.active_profile_id = first.id.clone();
        }
    }

    settings.check()?;
    Ok(settings)
}

/// Run the whole chain over a raw document
pub fn load_settings(document: &Document) -> LoadedSettings {
    match detect_layout(document) {
        SettingsLayout::Empty => LoadedSettings {
            settings: Settings::default(),
            needs_persist: false,
            stale_root_keys: Vec::new(),
            validation_error: None,
        },
        SettingsLayout::Legacy { settings, at_root } => LoadedSettings {
            settings: migrate_legacy(&settings),
            needs_persist: true,
            stale_root_keys: if at_root {
                legacy_root_keys(document)
            } else {
                Vec::new()
            },
            validation_error: None,
        },
        SettingsLayout::RootLevel(value) => {
            let stale_root_keys = document
                .keys()
                .filter(|key| is_root_settings_key(key))
                .cloned()
                .collect();
            match validate(value) {
                Ok(settings) => LoadedSettings {
                    settings,
                    needs_persist: true,
                    stale_root_keys,
                    validation_error: None,
                },
                Err(reason) => fallback(reason),
            }
        }
        SettingsLayout::Keyed(value) => match validate(value) {
            Ok(settings) => LoadedSettings {
                settings,
                needs_persist: false,
                stale_root_keys: Vec::new(),
                validation_error: None,
            },
            Err(reason) => fallback(reason),
        },
    }
}

fn fallback(reason: String) -> LoadedSettings {
    LoadedSettings {
        settings: Settings::default(),
        needs_persist: false,
        stale_root_keys: Vec::new(),
        validation_error: Some(reason),
    }
}

fn legacy_fields(object: &Document) -> Option<LegacySettings> {
    if has_any(object, &PROFILE_LIST_FIELDS) {
        return None;
    }

    let is_legacy = LEGACY_API_KEY_FIELDS
        .iter()
        .chain(LEGACY_BASE_URL_FIELDS.iter())
        .chain(std::iter::once(&LEGACY_MODEL_FIELD))
        .any(|field| object.contains_key(*field));
    if !is_legacy {
        return None;
    }

    Some(LegacySettings {
        api_key: first_string(object, &LEGACY_API_KEY_FIELDS).unwrap_or_default(),
        base_url: first_string(object, &LEGACY_BASE_URL_FIELDS),
        model_name: first_string(object, &[LEGACY_MODEL_FIELD]),
    })
}

fn legacy_root_keys(document: &Document) -> Vec<String> {
    LEGACY_API_KEY_FIELDS
        .iter()
        .chain(LEGACY_BASE_URL_FIELDS.iter())
        .chain(std::iter::once(&LEGACY_MODEL_FIELD))
        .filter(|field| document.contains_key(**field))
        .map(|field| field.to_string())
        .collect()
}

fn is_root_settings_key(key: &str) -> bool {
    PROFILE_LIST_FIELDS.contains(&key) || ACTIVE_ID_FIELDS.contains(&key)
}

fn has_any(object: &Document, fields: &[&str]) -> bool {
    fields.iter().any(|field| object.contains_key(*field))
}

fn first_string(object: &Document, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| object.get(*field))
        .filter_map(Value::as_str)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents are objects"),
        }
    }

    #[test]
    fn test_flat_settings_migrate_to_single_profile() {
        let loaded = load_settings(&document(json!({
            "apiKey": "k",
            "baseUrl": "u",
            "modelName": "m"
        })));

        assert!(loaded.needs_persist);
        assert_eq!(loaded.settings.profiles.len(), 1);

        let profile = &loaded.settings.profiles[0];
        assert_eq!(profile.id, DEFAULT_PROFILE_ID);
        assert_eq!(profile.api_key, "k");
        assert_eq!(profile.base_url, "u");
        assert_eq!(profile.models[0], "m");
        assert_eq!(profile.default_model_id, "m");
        assert_eq!(loaded.settings.active_profile_id, DEFAULT_PROFILE_ID);

        let mut stale = loaded.stale_root_keys.clone();
        stale.sort();
        assert_eq!(stale, vec!["apiKey", "baseUrl", "modelName"]);
    }

    #[test]
    fn test_openai_prefixed_legacy_fields() {
        let layout = detect_layout(&document(json!({
            "openAIApiKey": "sk-old",
            "openAIBaseUrl": "",
            "history": {"sessions": []}
        })));

        let SettingsLayout::Legacy { settings, at_root } = layout else {
            panic!("expected legacy layout");
        };
        assert!(at_root);
        assert_eq!(settings.api_key, "sk-old");
        assert_eq!(settings.base_url, None);

        let migrated = migrate_legacy(&settings);
        let profile = &migrated.profiles[0];
        assert_eq!(profile.base_url, DEFAULT_BASE_URL);
        assert_eq!(profile.models, vec!["gpt-3.5-turbo", "gpt-4", "gpt-4o"]);
        assert_eq!(profile.default_model_id, "gpt-3.5-turbo");
    }

    #[test]
    fn test_legacy_model_already_in_stock_list_is_not_duplicated() {
        let migrated = migrate_legacy(&LegacySettings {
            api_key: "k".into(),
            base_url: None,
            model_name: Some("gpt-4o".into()),
        });
        assert_eq!(migrated.profiles[0].models, vec!["gpt-4o", "gpt-4"]);
    }

    #[test]
    fn test_legacy_fields_under_settings_key() {
        let loaded = load_settings(&document(json!({
            "settings": {"apiKey": "k", "modelName": "m"}
        })));
        assert!(loaded.needs_persist);
        assert!(loaded.stale_root_keys.is_empty());
        assert_eq!(loaded.settings.profiles[0].api_key, "k");
    }

    #[test]
    fn test_profile_list_wins_over_flat_fields() {
        let layout = detect_layout(&document(json!({
            "settings": {
                "apiKey": "ignored",
                "profiles": [{"id": "a", "name": "A"}],
                "activeProfileId": "a"
            }
        })));
        assert!(matches!(layout, SettingsLayout::Keyed(_)));
    }

    #[test]
    fn test_root_level_profiles_are_relocated() {
        let loaded = load_settings(&document(json!({
            "providers": [{"id": "a", "name": "A", "apiKey": "sk"}],
            "activeProviderId": "a",
            "history": {"sessions": []}
        })));

        assert!(loaded.needs_persist);
        assert_eq!(loaded.settings.active_profile_id, "a");
        assert_eq!(loaded.settings.profiles[0].api_key, "sk");

        let mut stale = loaded.stale_root_keys.clone();
        stale.sort();
        assert_eq!(stale, vec!["activeProviderId", "providers"]);
    }

    #[test]
    fn test_empty_document_uses_defaults_without_persisting() {
        let loaded = load_settings(&Document::new());
        assert!(!loaded.needs_persist);
        assert_eq!(loaded.validation_error, None);
        assert_eq!(loaded.settings, Settings::default());
    }

    #[test]
    fn test_validate_fills_missing_fields() {
        let settings = validate(json!({"profiles": [{"id": "x", "name": "X"}]})).unwrap();

        let profile = &settings.profiles[0];
        assert_eq!(profile.models, vec!["gpt-3.5-turbo", "gpt-4", "gpt-4o"]);
        assert_eq!(profile.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.active_profile_id, "x");
    }

    #[test]
    fn test_validate_repairs_dangling_active_id() {
        let settings = validate(json!({
            "profiles": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}],
            "activeProfileId": "gone"
        }))
        .unwrap();
        assert_eq!(settings.active_profile_id, "a");
    }

    #[test_log::test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let loaded = load_settings(&document(json!({
            "settings": {"profiles": [{"id": 5}]}
        })));
        assert!(loaded.validation_error.is_some());
        assert!(!loaded.needs_persist);
        assert_eq!(loaded.settings, Settings::default());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = validate(json!({
            "profiles": [{"id": "a", "name": "A"}, {"id": "a", "name": "Again"}],
            "activeProfileId": "a"
        }));
        assert!(result.unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_empty_profile_list_is_rejected() {
        let result = validate(json!({"profiles": [], "activeProfileId": "a"}));
        assert!(result.is_err());
    }
}
