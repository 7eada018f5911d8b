//! Client configuration.

use std::time::Duration;
use url::Url;

use crate::error::ApiError;

/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default auth endpoint.
pub const DEFAULT_AUTH_URL: &str = "http://localhost:3000/api/auth";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default health check deadline in seconds.
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`crate::ApiClient`].
#[derive(Clone)]
pub struct ApiClientConfig {
    /// Backend origin; every endpoint is relative to it.
    pub base_url: String,
    /// Endpoint returning `{accessToken, expiresIn}`.
    pub auth_url: String,
    /// Session cookie sent to the auth endpoint.
    pub session_cookie: Option<String>,
    /// Timeout for ordinary requests.
    pub timeout: Duration,
    /// Deadline for the health check.
    pub health_timeout: Duration,
}

impl ApiClientConfig {
    /// Creates a config for `base_url` with defaults elsewhere.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the auth endpoint.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Sets the session cookie.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the health check deadline.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Checks that both URLs parse as http(s) URLs.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (name, value) in [("base URL", &self.base_url), ("auth URL", &self.auth_url)] {
            let url = Url::parse(value)
                .map_err(|e| ApiError::Config(format!("invalid {name} '{value}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ApiError::Config(format!(
                    "{name} must use http or https, got '{}'",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            session_cookie: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("health_timeout", &self.health_timeout)
            .finish()
    }
}
