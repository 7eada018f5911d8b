//! Usage analytics types.
//!
//! Both types are read-only aggregates fetched for analytics views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-service usage aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageStat {
    /// Service name (e.g. `qr-extraction`).
    pub service: String,
    /// Total calls in the window.
    pub total_calls: u64,
    /// Calls that returned 2xx.
    pub successful_calls: u64,
    /// Calls that failed.
    pub failed_calls: u64,
    /// Credits consumed.
    pub credits_used: i64,
    /// Mean response time in milliseconds.
    #[serde(alias = "avgResponseTime")]
    pub avg_response_time_ms: f64,
}

impl UsageStat {
    /// Success rate as a percentage, or `None` with no calls.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_calls == 0 {
            None
        } else {
            Some(self.successful_calls as f64 / self.total_calls as f64 * 100.0)
        }
    }
}

/// One audited API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageHistoryRecord {
    /// Record id.
    pub id: String,
    /// Correlation id sent with the request.
    #[serde(default, alias = "req_id")]
    pub req_id: Option<String>,
    /// Service name.
    pub service: String,
    /// HTTP status returned.
    #[serde(default)]
    pub status_code: u16,
    /// Credits charged.
    #[serde(default)]
    pub credits_used: i64,
    /// Response time in milliseconds.
    #[serde(default, alias = "responseTime")]
    pub response_time_ms: f64,
    /// When the call happened.
    pub timestamp: DateTime<Utc>,
}

impl UsageHistoryRecord {
    /// Returns true if the call succeeded.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Totals over a set of usage stats.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    /// Sum of calls.
    pub total_calls: u64,
    /// Sum of failed calls.
    pub failed_calls: u64,
    /// Sum of credits.
    pub credits_used: i64,
}

impl UsageTotals {
    /// Sums a slice of stats.
    pub fn from_stats(stats: &[UsageStat]) -> Self {
        stats.iter().fold(Self::default(), |acc, s| Self {
            total_calls: acc.total_calls + s.total_calls,
            failed_calls: acc.failed_calls + s.failed_calls,
            credits_used: acc.credits_used + s.credits_used,
        })
    }
}
