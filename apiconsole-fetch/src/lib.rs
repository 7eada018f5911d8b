// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # API Console Fetch
//!
//! Authenticated HTTP access to the API console backend.
//!
//! ## Components
//!
//! - [`auth`] - Bearer token cache and token sources
//! - [`client`] - Request executor with single re-auth retry
//! - [`interceptor`] - Hooks observing successful responses
//! - [`classify`] - Error kinds and display reports
//! - [`retry`] - Retry policy
//! - [`config`] - Client configuration
//!
//! ## Example
//!
//! ```ignore
//! use apiconsole_fetch::{ApiClient, ApiClientConfig};
//!
//! let client = ApiClient::builder(ApiClientConfig::new("https://api.example.com"))
//!     .interceptor(credits_sync)
//!     .build()?;
//!
//! let balance: serde_json::Value = client.get("/credits/balance").await?;
//! ```

pub mod auth;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod retry;

// Errors
pub use classify::{ErrorKind, ErrorReport};
pub use error::ApiError;

// Auth
pub use auth::{AuthTokenCache, HttpTokenSource, StaticTokenSource, TokenSource};

// Client
pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use config::{
    ApiClientConfig, DEFAULT_AUTH_URL, DEFAULT_BASE_URL, DEFAULT_HEALTH_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};
pub use interceptor::{InterceptedResponse, ResponseInterceptor};
pub use retry::RetryPolicy;

// Re-exported so callers can name methods and statuses without a reqwest dependency.
pub use reqwest::{Method, StatusCode};
