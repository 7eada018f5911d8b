//! Bearer token cache.
//!
//! The backend authenticates requests with a short-lived bearer token
//! obtained from an auth endpoint:
//!
//! ```text
//! GET <auth_url>
//! Cookie: <session cookie>
//!
//! {"accessToken": "...", "expiresIn": 3600}
//! ```
//!
//! [`AuthTokenCache`] keeps the last token and hands it out until it is
//! within five minutes of expiry. It never retries on its own; the request
//! executor decides when to clear and refetch.

use apiconsole_core::AuthToken;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, header};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::ApiError;

// ============================================================================
// Token Sources
// ============================================================================

/// Something that can mint a bearer token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetches a fresh token.
    async fn fetch_token(&self) -> Result<AuthToken, ApiError>;
}

/// Body returned by the auth endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: String,
    expires_in: i64,
}

/// Fetches tokens from the session-authenticated auth endpoint.
pub struct HttpTokenSource {
    http: Client,
    auth_url: String,
    session_cookie: Option<String>,
}

impl HttpTokenSource {
    /// Creates a source for `auth_url`.
    pub fn new(http: Client, auth_url: impl Into<String>, session_cookie: Option<String>) -> Self {
        Self {
            http,
            auth_url: auth_url.into(),
            session_cookie,
        }
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    #[instrument(skip(self), fields(url = %self.auth_url))]
    async fn fetch_token(&self) -> Result<AuthToken, ApiError> {
        debug!("Fetching access token");

        let mut request = self.http.get(&self.auth_url);
        if let Some(ref cookie) = self.session_cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| ApiError::Network {
            base_url: self.auth_url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Auth endpoint rejected token request");
            return Err(ApiError::Authentication(format!(
                "failed to get access token (status {})",
                status.as_u16()
            )));
        }

        let body: AuthResponse = response.json().await.map_err(|e| {
            ApiError::Authentication(format!("invalid auth response: {e}"))
        })?;

        debug!(expires_in = body.expires_in, "Access token received");
        AuthToken::from_expires_in(body.access_token, body.expires_in).ok_or_else(|| {
            warn!(expires_in = body.expires_in, "Auth endpoint returned unusable expiry");
            ApiError::Authentication("invalid expiresIn".to_string())
        })
    }
}

/// A fixed token, e.g. an API key supplied on the command line.
///
/// Clearing the cache has no effect on it: the same token comes back.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    /// Wraps `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch_token(&self) -> Result<AuthToken, ApiError> {
        Ok(AuthToken {
            value: self.token.clone(),
            expires_at: Utc::now() + Duration::days(365),
        })
    }
}

// ============================================================================
// Token Cache
// ============================================================================

/// Caches the current bearer token.
///
/// Concurrent misses may fetch in parallel; the last fetched token wins.
pub struct AuthTokenCache {
    source: Arc<dyn TokenSource>,
    cached: RwLock<Option<AuthToken>>,
}

impl AuthTokenCache {
    /// Creates an empty cache backed by `source`.
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    /// Returns a usable bearer token, fetching one on a miss.
    ///
    /// On fetch failure the cache is cleared and the error returned.
    pub async fn get_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_usable() {
                debug!("Token cache hit");
                return Ok(token.value.clone());
            }
            debug!(expires_at = %token.expires_at, "Cached token inside refresh buffer");
        }

        match self.source.fetch_token().await {
            Ok(token) => {
                let value = token.value.clone();
                *self.cached.write().await = Some(token);
                Ok(value)
            }
            Err(e) => {
                self.clear().await;
                Err(e)
            }
        }
    }

    /// Drops the cached token.
    pub async fn clear(&self) {
        *self.cached.write().await = None;
    }

    /// Returns a copy of the cached token, usable or not.
    pub async fn cached(&self) -> Option<AuthToken> {
        self.cached.read().await.clone()
    }

    /// Replaces the cached token.
    pub async fn store(&self, token: AuthToken) {
        *self.cached.write().await = Some(token);
    }
}

// ============================================================================
// Tests
// ============================================================================
