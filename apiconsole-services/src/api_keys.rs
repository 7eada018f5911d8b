//! API key operations.

use apiconsole_core::ApiKeyInfo;
use apiconsole_fetch::ApiError;
use serde::Serialize;
use tracing::{info, instrument};

use crate::api::ConsoleApi;
use crate::validation::require_non_empty;

/// API key endpoint.
const API_KEYS_ENDPOINT: &str = "/api-keys";

#[derive(Debug, Serialize)]
struct CreateKeyRequest<'a> {
    name: &'a str,
}

impl ConsoleApi {
    /// Creates a named API key. The key text is only returned once.
    #[instrument(skip(self))]
    pub async fn create_api_key(&self, name: &str) -> Result<ApiKeyInfo, ApiError> {
        let name = require_non_empty("API key name", name)?;

        let key: ApiKeyInfo = self
            .client()
            .post(API_KEYS_ENDPOINT, &CreateKeyRequest { name })
            .await?;

        info!(id = ?key.id, "API key created");
        Ok(key)
    }
}
