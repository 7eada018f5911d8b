//! Backend health check.

use apiconsole_core::HealthStatus;
use apiconsole_fetch::ApiError;
use tracing::{debug, instrument};

use crate::api::ConsoleApi;

/// Health endpoint.
const HEALTH_ENDPOINT: &str = "/health";

impl ConsoleApi {
    /// Checks backend health without credentials.
    ///
    /// Gives up after the configured health deadline (10 seconds by
    /// default) with [`ApiError::Timeout`].
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let deadline = self.client().config().health_timeout;
        let status: HealthStatus = self.client().probe(HEALTH_ENDPOINT, deadline).await?;
        debug!(status = %status.status, "Health checked");
        Ok(status)
    }
}
