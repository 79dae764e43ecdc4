//! Settings migration against real files

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use synapse::state::{
    FileDocumentStore, HistoryStore, SettingsStore, SharedDocument, StateError,
    DEFAULT_PROFILE_ID,
};
use synapse::UuidGenerator;
use tempfile::TempDir;

fn write(dir: &TempDir, value: Value) -> std::path::PathBuf {
    let path = dir.path().join("data.json");
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

fn read(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn settings_store(path: &std::path::Path) -> SettingsStore {
    let document = Arc::new(SharedDocument::new(Arc::new(FileDocumentStore::new(path))));
    SettingsStore::new(document, Arc::new(UuidGenerator))
}

#[tokio::test]
async fn test_legacy_file_is_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        json!({
            "openAIApiKey": "sk-legacy",
            "openAIBaseUrl": "https://proxy.example/v1",
            "modelName": "gpt-4-turbo",
            "history": {"sessions": [], "activeSessionId": null}
        }),
    );

    let store = settings_store(&path);
    let report = store.load().await.unwrap();
    assert!(report.migrated);

    let active = store.active_profile().await.unwrap();
    assert_eq!(active.id, DEFAULT_PROFILE_ID);
    assert_eq!(active.api_key, "sk-legacy");
    assert_eq!(active.base_url, "https://proxy.example/v1");
    assert_eq!(active.models, vec!["gpt-4-turbo", "gpt-4", "gpt-4o"]);
    assert_eq!(active.default_model_id, "gpt-4-turbo");

    let stored = read(&path);
    assert_eq!(
        stored,
        json!({
            "history": {"sessions": [], "activeSessionId": null},
            "settings": {
                "profiles": [{
                    "id": "default-openai",
                    "name": "Default OpenAI",
                    "type": "openai",
                    "apiKey": "sk-legacy",
                    "baseUrl": "https://proxy.example/v1",
                    "models": ["gpt-4-turbo", "gpt-4", "gpt-4o"],
                    "defaultModelId": "gpt-4-turbo"
                }],
                "activeProfileId": "default-openai"
            }
        })
    );
}

#[tokio::test]
async fn test_old_multi_profile_root_layout_is_moved_under_settings() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        json!({
            "providers": [
                {"id": "a", "name": "A", "type": "anthropic", "apiKey": "k1"},
                {"id": "b", "name": "B", "apiKey": "k2", "models": ["m1", "m2"], "defaultModelId": "m2"}
            ],
            "activeProviderId": "b"
        }),
    );

    let store = settings_store(&path);
    assert!(store.load().await.unwrap().migrated);

    let stored = read(&path);
    assert!(stored.get("providers").is_none());
    assert!(stored.get("activeProviderId").is_none());
    assert_eq!(stored["settings"]["activeProfileId"], "b");
    assert_eq!(stored["settings"]["profiles"][0]["type"], "anthropic");
    assert_eq!(
        stored["settings"]["profiles"][0]["models"],
        json!(["gpt-3.5-turbo", "gpt-4", "gpt-4o"])
    );
    assert_eq!(store.active_profile().await.unwrap().effective_model(), Some("m2"));
}

#[tokio::test]
async fn test_unreadable_settings_fall_back_and_keep_file() {
    let dir = TempDir::new().unwrap();
    let original = json!({"settings": {"profiles": [{"name": "no id"}]}});
    let path = write(&dir, original.clone());

    let store = settings_store(&path);
    let report = store.load().await.unwrap();
    assert!(report.validation_error.is_some());
    assert!(!report.migrated);
    assert_eq!(store.active_profile().await.unwrap().id, DEFAULT_PROFILE_ID);
    assert_eq!(read(&path), original);
}

#[tokio::test]
async fn test_profile_lifecycle_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.json");

    let store = settings_store(&path);
    store.load().await.unwrap();
    assert!(!path.exists());

    let added = store.add_profile().await.unwrap();
    assert!(added.id.starts_with("provider-"));
    store.set_active_profile(&added.id).await.unwrap();
    store.delete_profile(&added.id).await.unwrap();

    let reloaded = settings_store(&path);
    reloaded.load().await.unwrap();
    let settings = reloaded.settings().await;
    assert_eq!(settings.profiles.len(), 1);
    assert_eq!(settings.active_profile_id, DEFAULT_PROFILE_ID);

    let result = reloaded.delete_profile(DEFAULT_PROFILE_ID).await;
    assert!(matches!(result, Err(StateError::LastProfile)));
}

#[tokio::test]
async fn test_settings_and_history_share_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.json");
    let document = Arc::new(SharedDocument::new(Arc::new(FileDocumentStore::new(&path))));

    let settings = Arc::new(SettingsStore::new(document.clone(), Arc::new(UuidGenerator)));
    let history = Arc::new(HistoryStore::new(document, Arc::new(UuidGenerator)));
    settings.load().await.unwrap();
    history.initialize().await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let settings = settings.clone();
        let history = history.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                settings.add_profile().await.map(|_| ())
            } else {
                history.create_session().await.map(|_| ())
            }
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = read(&path);
    assert_eq!(stored["settings"]["profiles"].as_array().map(Vec::len), Some(5));
    assert_eq!(stored["history"]["sessions"].as_array().map(Vec::len), Some(5));
}
