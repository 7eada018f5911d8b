//! Usage analytics.

use apiconsole_core::{UsageHistoryRecord, UsageStat};
use apiconsole_fetch::{ApiError, Method, RequestOptions};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::api::{ConsoleApi, list_from_value};

/// Per-service aggregates endpoint.
const STATS_ENDPOINT: &str = "/usage/stats";

/// Per-call history endpoint.
const HISTORY_ENDPOINT: &str = "/usage/history";

/// Default aggregation window.
pub const DEFAULT_STATS_DAYS: u32 = 30;

/// Default history page size.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

impl ConsoleApi {
    /// Per-service aggregates over the last `days` days.
    #[instrument(skip(self))]
    pub async fn usage_stats(&self, days: u32) -> Result<Vec<UsageStat>, ApiError> {
        let options = RequestOptions::new().query("days", days);
        let body: Value = self
            .client()
            .request(Method::GET, STATS_ENDPOINT, options)
            .await?;

        let stats: Vec<UsageStat> = list_from_value(body, &["stats", "data", "services"])?;
        debug!(services = stats.len(), "Usage stats fetched");
        Ok(stats)
    }

    /// The most recent `limit` calls, newest first.
    #[instrument(skip(self))]
    pub async fn usage_history(&self, limit: u32) -> Result<Vec<UsageHistoryRecord>, ApiError> {
        let options = RequestOptions::new().query("limit", limit);
        let body: Value = self
            .client()
            .request(Method::GET, HISTORY_ENDPOINT, options)
            .await?;

        let records: Vec<UsageHistoryRecord> =
            list_from_value(body, &["history", "data", "records"])?;
        debug!(records = records.len(), "Usage history fetched");
        Ok(records)
    }
}
