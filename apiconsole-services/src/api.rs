//! Typed facade over the request executor.
//!
//! [`ConsoleApi`] owns an [`ApiClient`] and exposes one method per backend
//! operation. The methods live next to their domain: tokens in
//! [`crate::tokens`], processing services in [`crate::services`], and so on.

use apiconsole_fetch::{ApiClient, ApiError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Typed backend operations.
#[derive(Debug, Clone)]
pub struct ConsoleApi {
    client: ApiClient,
}

impl ConsoleApi {
    /// Wraps a configured client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Drops the cached access token.
    pub async fn refresh_auth(&self) {
        self.client.refresh_auth().await;
    }
}

/// Reads a list that may come bare or wrapped in an object.
///
/// Accepts `[...]`, or `{"<key>": [...]}` for the first matching key.
pub(crate) fn list_from_value<T: DeserializeOwned>(
    body: Value,
    keys: &[&str],
) -> Result<Vec<T>, ApiError> {
    let items = match body {
        Value::Array(_) => body,
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut map) => keys
            .iter()
            .find_map(|k| map.remove(*k).filter(Value::is_array))
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!("expected a list under one of {keys:?}"))
            })?,
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "expected a list, got {other}"
            )));
        }
    };

    serde_json::from_value(items)
        .map_err(|e| ApiError::InvalidResponse(format!("unexpected list item: {e}")))
}
