//! Persistence round-trip and edge case tests.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{ensure_dir, load_json, load_json_or_default, save_json, write_text};
use crate::settings_store::{LogLevel, Settings, SettingsStore};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    let data = serde_json::json!({"key": "value"});

    save_json(&nested_path, &data).await.unwrap();
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_or_default_on_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(&path, "{not json").await.unwrap();

    let settings: Settings = load_json_or_default(&path).await;
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("exports");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

#[tokio::test]
async fn test_write_text_creates_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out").join("tokens.csv");

    write_text(&path, "a,b\n").await.unwrap();

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(contents, "a,b\n");
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let mut settings = Settings::default();
    settings.api_base_url = "https://api.example.com".to_string();
    settings.session_cookie = Some("sid=abc".to_string());
    settings.request_timeout_secs = 12;
    settings.log_level = LogLevel::Debug;
    settings.export_dir = Some(temp_dir.path().to_path_buf());

    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, r#"{"api_base_url": "https://partial.test"}"#)
        .await
        .unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert_eq!(loaded.api_base_url, "https://partial.test");
    assert_eq!(loaded.request_timeout_secs, 30);
    assert_eq!(loaded.health_timeout_secs, 10);
}

#[tokio::test]
async fn test_unset_secrets_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    save_json(&file_path, &Settings::default()).await.unwrap();
    let raw = tokio::fs::read_to_string(&file_path).await.unwrap();

    assert!(!raw.contains("session_cookie"));
    assert!(!raw.contains("access_token"));
}

#[tokio::test]
async fn test_settings_store_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::load(file_path.clone()).await;
    assert_eq!(store.get().await, Settings::default());

    store.set("health_timeout_secs", "20").await.unwrap();
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(file_path).await;
    assert_eq!(reloaded.get().await.health_timeout_secs, 20);
}

#[tokio::test]
async fn test_settings_store_corrupt_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "[]").await.unwrap();

    let store = SettingsStore::load(file_path).await;
    assert_eq!(store.get().await, Settings::default());
}
