//! Config command - manage configuration.

use anyhow::Result;
use apiconsole_store::{Settings, default_config_dir};
use clap::{Args, Subcommand};
use tracing::info;

use super::emit;
use crate::Cli;
use crate::session::{load_settings, settings_store};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (file, environment and flags).
    Show,

    /// Show configuration paths.
    Path,

    /// Set one setting and save.
    Set {
        /// Setting name (see `config keys`).
        key: String,
        /// New value; an empty string clears optional settings.
        value: String,
    },

    /// List setting names.
    Keys,

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli).await,
        ConfigAction::Set { key, value } => set_value(key, value, cli).await,
        ConfigAction::Keys => {
            emit(cli, Settings::KEYS, |_| Settings::KEYS.join("\n"))
        }
        ConfigAction::Reset => reset_config(cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli).await.redacted();
    emit(cli, &settings, |f| f.format_settings(&settings))
}

async fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let store = settings_store(cli).await;
    let settings_path = store.path();

    let paths = serde_json::json!({
        "config_dir": config_dir.display().to_string(),
        "settings_file": settings_path.display().to_string(),
    });
    emit(cli, &paths, |f| {
        format!(
            "{}\n{}\n\nConfig dir:    {}\nSettings file: {}",
            f.bold("Configuration Paths"),
            "─".repeat(40),
            config_dir.display(),
            settings_path.display()
        )
    })
}

async fn set_value(key: &str, value: &str, cli: &Cli) -> Result<()> {
    let store = settings_store(cli).await;
    store.set(key, value).await?;
    store.save().await?;

    info!(key, "Setting updated");
    let result = serde_json::json!({"key": key, "saved": store.path()});
    emit(cli, &result, |f| f.format_success(&format!("Set {key}")))
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let store = settings_store(cli).await;
    let path = store.path();

    let removed = if path.exists() {
        tokio::fs::remove_file(path).await?;
        info!(path = %path.display(), "Settings reset");
        true
    } else {
        false
    };

    let result = serde_json::json!({"reset": removed});
    emit(cli, &result, |_| {
        if removed {
            "Configuration reset to defaults".to_string()
        } else {
            "No configuration file to reset".to_string()
        }
    })
}
