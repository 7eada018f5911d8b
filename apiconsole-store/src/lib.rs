// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # API Console Store
//!
//! Client-side state for the API console.
//!
//! This crate provides:
//!
//! - **CreditsStore**: The shared credit balance, with watch channels
//! - **CreditsSync**: Response interceptor that keeps the balance current
//! - **ApiCall**: Loading/data/error tracking for a single operation
//! - **SettingsStore**: Connection preferences with persistence
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use apiconsole_fetch::{ApiClient, ApiClientConfig};
//! use apiconsole_store::{CreditsStore, CreditsSync};
//!
//! let credits = CreditsStore::new();
//! let client = ApiClient::builder(ApiClientConfig::default())
//!     .interceptor(Arc::new(CreditsSync::new(credits.clone())))
//!     .build()?;
//!
//! let mut rx = credits.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Balance: {:?}", credits.credits().await);
//! }
//! ```

pub mod call_state;
pub mod credits_store;
pub mod error;
pub mod persistence;
pub mod settings_store;

pub use call_state::{ApiCall, ApiCallState, CallStatus};
pub use credits_store::{CreditsStore, CreditsSync};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_export_dir, default_settings_path, ensure_dir, load_json,
    load_json_or_default, save_json, write_text,
};
pub use settings_store::{
    ENV_ACCESS_TOKEN, ENV_API_URL, ENV_AUTH_URL, ENV_SESSION_COOKIE, LogLevel, Settings,
    SettingsStore,
};

#[cfg(test)]
mod persistence_tests;
