//! Wiring from settings to a ready client.

use anyhow::{Context, Result};
use apiconsole_fetch::{ApiClient, StaticTokenSource};
use apiconsole_services::{ConsoleApi, CreditsService};
use apiconsole_store::{CreditsStore, CreditsSync, Settings, SettingsStore};
use std::sync::Arc;
use tracing::debug;

use crate::Cli;

/// Everything a command needs to talk to the backend.
pub struct Session {
    /// Typed operations.
    pub api: ConsoleApi,
    /// Balance workflows; shares its store with the client's interceptor.
    pub credits: CreditsService,
    /// Effective settings.
    pub settings: Settings,
}

impl Session {
    /// Loads settings, applies overrides and builds the client.
    pub async fn open(cli: &Cli) -> Result<Self> {
        let settings = load_settings(cli).await;
        let store = CreditsStore::new();

        let mut builder = ApiClient::builder(settings.client_config())
            .interceptor(Arc::new(CreditsSync::new(store.clone())));
        if let Some(ref token) = settings.access_token {
            debug!("Using configured access token");
            builder = builder.token_source(Arc::new(StaticTokenSource::new(token.clone())));
        }
        let client = builder.build().context("invalid connection settings")?;

        let api = ConsoleApi::new(client);
        let credits = CreditsService::new(api.clone(), store);
        Ok(Self {
            api,
            credits,
            settings,
        })
    }
}

/// Opens the settings store named on the command line, or the default one.
pub async fn settings_store(cli: &Cli) -> SettingsStore {
    match cli.settings {
        Some(ref path) => SettingsStore::load(path.clone()).await,
        None => SettingsStore::load_default().await,
    }
}

/// Effective settings: file, then environment, then command line.
pub async fn load_settings(cli: &Cli) -> Settings {
    let mut settings = settings_store(cli).await.effective().await;
    if let Some(ref url) = cli.api_url {
        settings.api_base_url = url.clone();
    }
    settings
}
