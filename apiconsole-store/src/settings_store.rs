//! User preferences store.
//!
//! Manages connection settings with persistence and change notification.

use apiconsole_fetch::{
    ApiClientConfig, DEFAULT_AUTH_URL, DEFAULT_BASE_URL, DEFAULT_HEALTH_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Overrides [`Settings::api_base_url`].
pub const ENV_API_URL: &str = "APICONSOLE_API_URL";
/// Overrides [`Settings::auth_url`].
pub const ENV_AUTH_URL: &str = "APICONSOLE_AUTH_URL";
/// Overrides [`Settings::session_cookie`].
pub const ENV_SESSION_COOKIE: &str = "APICONSOLE_SESSION_COOKIE";
/// Overrides [`Settings::access_token`].
pub const ENV_ACCESS_TOKEN: &str = "APICONSOLE_ACCESS_TOKEN";

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend origin.
    pub api_base_url: String,

    /// Endpoint that exchanges the session cookie for a bearer token.
    pub auth_url: String,

    /// Session cookie sent to the auth endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// Fixed bearer token; bypasses the auth endpoint when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Timeout for ordinary requests, in seconds.
    pub request_timeout_secs: u64,

    /// Deadline for the health check, in seconds.
    pub health_timeout_secs: u64,

    /// Log level.
    pub log_level: LogLevel,

    /// Where CSV exports are written; the download directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            session_cookie: None,
            access_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            log_level: LogLevel::default(),
            export_dir: None,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_base_url", &self.api_base_url)
            .field("auth_url", &self.auth_url)
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("health_timeout_secs", &self.health_timeout_secs)
            .field("log_level", &self.log_level)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}

impl Settings {
    /// Keys accepted by [`Settings::set`].
    pub const KEYS: &'static [&'static str] = &[
        "api_base_url",
        "auth_url",
        "session_cookie",
        "access_token",
        "request_timeout_secs",
        "health_timeout_secs",
        "log_level",
        "export_dir",
    ];

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            debug!(url = %url, "Base URL from environment");
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_AUTH_URL) {
            debug!(url = %url, "Auth URL from environment");
            self.auth_url = url;
        }
        if let Some(cookie) = get(ENV_SESSION_COOKIE) {
            debug!("Session cookie from environment");
            self.session_cookie = Some(cookie);
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            debug!("Access token from environment");
            self.access_token = Some(token);
        }
    }

    /// Sets one field from its string form.
    ///
    /// An empty value clears optional fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        let seconds = |v: &str| -> Result<u64, StoreError> {
            match v.parse::<u64>() {
                Ok(0) | Err(_) => Err(StoreError::Parse(format!(
                    "{key} must be a positive number of seconds, got '{v}'"
                ))),
                Ok(n) => Ok(n),
            }
        };

        match key {
            "api_base_url" => self.api_base_url = value.to_string(),
            "auth_url" => self.auth_url = value.to_string(),
            "session_cookie" => self.session_cookie = optional(value),
            "access_token" => self.access_token = optional(value),
            "request_timeout_secs" => self.request_timeout_secs = seconds(value)?,
            "health_timeout_secs" => self.health_timeout_secs = seconds(value)?,
            "log_level" => self.log_level = value.parse()?,
            "export_dir" => self.export_dir = optional(value).map(PathBuf::from),
            other => return Err(StoreError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// Builds the HTTP client configuration.
    pub fn client_config(&self) -> ApiClientConfig {
        let mut config = ApiClientConfig::new(self.api_base_url.clone())
            .with_auth_url(self.auth_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_health_timeout(Duration::from_secs(self.health_timeout_secs));
        if let Some(ref cookie) = self.session_cookie {
            config = config.with_session_cookie(cookie.clone());
        }
        config
    }

    /// Copy with secrets replaced, for display.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "<redacted>".to_string());
        Self {
            session_cookie: mask(&self.session_cookie),
            access_token: mask(&self.access_token),
            ..self.clone()
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl LogLevel {
    /// `tracing` filter directive enabling this level for the console crates.
    pub fn directive(&self) -> String {
        format!("apiconsole={self}")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(StoreError::Parse(format!("unknown log level '{other}'"))),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store with default settings.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing or unreadable file yields defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Self::with_settings(path, settings)
    }

    /// Path the store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the stored settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Gets the stored settings with environment overrides applied.
    pub async fn effective(&self) -> Settings {
        let mut settings = self.get().await;
        settings.apply_env();
        settings
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Sets one field by key.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut settings = self.settings.write().await;
            settings.set(key, value)?;
        }
        self.notify_change().await;
        Ok(())
    }

    /// Saves settings to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.auth_url, "http://localhost:3000/api/auth");
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.health_timeout_secs, 10);
        assert!(settings.session_cookie.is_none());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut settings = Settings::default();
        settings.api_base_url = "http://from-file:1".to_string();

        settings.apply_env_with(env(&[
            (ENV_API_URL, "https://api.example.com"),
            (ENV_SESSION_COOKIE, "sid=1"),
        ]));

        assert_eq!(settings.api_base_url, "https://api.example.com");
        assert_eq!(settings.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(settings.session_cookie.as_deref(), Some("sid=1"));
    }

    #[test]
    fn test_empty_env_ignored() {
        let mut settings = Settings::default();
        settings.apply_env_with(env(&[(ENV_API_URL, "  ")]));
        assert_eq!(settings.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_set_by_key() {
        let mut settings = Settings::default();
        settings.set("api_base_url", "https://x.test").unwrap();
        settings.set("request_timeout_secs", "5").unwrap();
        settings.set("log_level", "DEBUG").unwrap();
        settings.set("session_cookie", "sid=2").unwrap();

        assert_eq!(settings.api_base_url, "https://x.test");
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.log_level, LogLevel::Debug);

        settings.set("session_cookie", "").unwrap();
        assert!(settings.session_cookie.is_none());
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("colour", "blue"),
            Err(StoreError::UnknownSetting(_))
        ));
        assert!(matches!(
            settings.set("request_timeout_secs", "0"),
            Err(StoreError::Parse(_))
        ));
        assert!(settings.set("log_level", "loud").is_err());
    }

    #[test]
    fn test_every_key_settable() {
        for key in Settings::KEYS {
            let mut settings = Settings::default();
            let value = match *key {
                "request_timeout_secs" | "health_timeout_secs" => "3",
                "log_level" => "info",
                _ => "value",
            };
            settings.set(key, value).unwrap();
        }
    }

    #[test]
    fn test_client_config() {
        let mut settings = Settings::default();
        settings.session_cookie = Some("sid=3".to_string());
        settings.health_timeout_secs = 4;

        let config = settings.client_config();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session_cookie.as_deref(), Some("sid=3"));
        assert_eq!(config.health_timeout, Duration::from_secs(4));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_log_level_directive() {
        assert_eq!(LogLevel::default().directive(), "apiconsole=warn");
        assert_eq!(LogLevel::Trace.directive(), "apiconsole=trace");
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut settings = Settings::default();
        settings.set("session_cookie", "sid=abc").unwrap();
        let shown = settings.redacted();
        assert_eq!(shown.session_cookie.as_deref(), Some("<redacted>"));
        assert!(shown.access_token.is_none());
        assert_eq!(shown.api_base_url, settings.api_base_url);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut settings = Settings::default();
        settings.session_cookie = Some("sid=secret".to_string());
        settings.access_token = Some("tok-secret".to_string());
        let text = format!("{settings:?}");
        assert!(!text.contains("secret"));
    }

    #[tokio::test]
    async fn test_store_set_notifies() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        let mut rx = store.subscribe();

        store.set("auth_url", "https://auth.test").await.unwrap();

        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert_eq!(store.get().await.auth_url, "https://auth.test");

        assert!(store.set("nope", "x").await.is_err());
        assert!(!rx.has_changed().unwrap());
    }
}
