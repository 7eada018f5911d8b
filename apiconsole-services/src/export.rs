//! CSV export of tables.
//!
//! Rows are comma-joined with a header line. Free-text columns (descriptions,
//! user ids, service names, request ids) are always double-quoted with
//! embedded quotes doubled; numeric and timestamp columns are written bare.

use apiconsole_core::{TokenInfo, UsageHistoryRecord, UsageStat};
use apiconsole_store::{StoreError, write_text};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Formatting
// ============================================================================

/// Quotes a free-text field.
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn render(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

// ============================================================================
// Tables
// ============================================================================

/// Token list as CSV.
pub fn tokens_csv(tokens: &[TokenInfo]) -> String {
    let now = Utc::now();
    render(
        &[
            "Token",
            "Credits",
            "Description",
            "Created By",
            "Created At",
            "Expires At",
            "Status",
            "Used By",
            "Used At",
        ],
        tokens.iter().map(|t| {
            let status = if t.is_used {
                "Used"
            } else if t.is_expired_at(now) {
                "Expired"
            } else {
                "Active"
            };
            vec![
                t.token.clone(),
                t.credits.to_string(),
                quote(&t.description),
                quote(&t.created_by),
                timestamp(t.created_at),
                timestamp(t.expires_at),
                status.to_string(),
                quote(t.used_by.as_deref().unwrap_or_default()),
                t.used_at.map(timestamp).unwrap_or_default(),
            ]
        }),
    )
}

/// Per-service usage aggregates as CSV.
pub fn usage_stats_csv(stats: &[UsageStat]) -> String {
    render(
        &[
            "Service",
            "Total Calls",
            "Successful Calls",
            "Failed Calls",
            "Success Rate (%)",
            "Credits Used",
            "Avg Response Time (ms)",
        ],
        stats.iter().map(|s| {
            vec![
                quote(&s.service),
                s.total_calls.to_string(),
                s.successful_calls.to_string(),
                s.failed_calls.to_string(),
                s.success_rate()
                    .map(|r| format!("{r:.1}"))
                    .unwrap_or_default(),
                s.credits_used.to_string(),
                format!("{:.0}", s.avg_response_time_ms),
            ]
        }),
    )
}

/// Per-call usage history as CSV.
pub fn usage_history_csv(records: &[UsageHistoryRecord]) -> String {
    render(
        &[
            "Timestamp",
            "Request ID",
            "Service",
            "Status Code",
            "Credits Used",
            "Response Time (ms)",
        ],
        records.iter().map(|r| {
            vec![
                timestamp(r.timestamp),
                quote(r.req_id.as_deref().unwrap_or_default()),
                quote(&r.service),
                r.status_code.to_string(),
                r.credits_used.to_string(),
                format!("{:.0}", r.response_time_ms),
            ]
        }),
    )
}

// ============================================================================
// Files
// ============================================================================

/// `<prefix>-YYYY-MM-DD.csv`.
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes `contents` to `dir` under today's date-stamped name.
pub async fn write_csv(dir: &Path, prefix: &str, contents: &str) -> Result<PathBuf, StoreError> {
    let path = dir.join(export_filename(prefix, Local::now().date_naive()));
    write_text(&path, contents).await?;
    info!(path = %path.display(), "Export written");
    Ok(path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn token(description: &str, is_used: bool) -> TokenInfo {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        TokenInfo {
            id: "1".to_string(),
            token: "0123456789abcdef0123456789abcdef".to_string(),
            credits: 100,
            created_by: "admin".to_string(),
            created_at: created,
            expires_at: Utc::now() + Duration::days(30),
            is_used,
            used_by: is_used.then(|| "user-9".to_string()),
            used_at: is_used.then_some(created),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_quote_doubles_quotes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(quote("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_tokens_csv() {
        let csv = tokens_csv(&[token("Promo, \"spring\"", false), token("", true)]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Token,Credits,Description"));
        assert!(lines[1].contains(r#""Promo, ""spring""""#));
        assert!(lines[1].contains(",Active,"));
        assert!(lines[1].contains("2024-03-01T12:00:00Z"));
        assert!(lines[2].contains(",Used,\"user-9\","));
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_expired_status() {
        let mut t = token("old", false);
        t.expires_at = Utc::now() - Duration::days(1);
        assert!(tokens_csv(&[t]).contains(",Expired,"));
    }

    #[test]
    fn test_usage_stats_csv() {
        let stats = vec![UsageStat {
            service: "qr-extraction".to_string(),
            total_calls: 10,
            successful_calls: 9,
            failed_calls: 1,
            credits_used: 10,
            avg_response_time_ms: 120.4,
        }];
        let csv = usage_stats_csv(&stats);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "\"qr-extraction\",10,9,1,90.0,10,120");
    }

    #[test]
    fn test_usage_history_csv() {
        let records = vec![UsageHistoryRecord {
            id: "h1".to_string(),
            req_id: Some("face-detect-1-abc".to_string()),
            service: "face-detect".to_string(),
            status_code: 200,
            credits_used: 1,
            response_time_ms: 88.0,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap(),
        }];
        let csv = usage_history_csv(&records);
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "2024-05-02T08:30:00Z,\"face-detect-1-abc\",\"face-detect\",200,1,88"
        );
    }

    #[test]
    fn test_empty_tables_have_header() {
        assert_eq!(usage_history_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(export_filename("tokens", date), "tokens-2024-01-09.csv");
    }

    #[tokio::test]
    async fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "usage-stats", "a,b\n").await.unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("usage-stats-"));
        assert!(name.ends_with(".csv"));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "a,b\n");
    }
}
