//! Text output formatting with tables, bars and colors.

use apiconsole_core::{
    ApiKeyInfo, CreditsState, HealthStatus, ServiceKind, ServiceResponse, TokenInfo, TokenList,
    UsageHistoryRecord, UsageStat, UsageTotals,
};
use apiconsole_fetch::ErrorReport;
use apiconsole_store::Settings;
use chrono::{DateTime, Duration, Local, Utc};
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    // ========================================================================
    // Credits and tokens
    // ========================================================================

    /// Formats the credit balance.
    pub fn format_balance(&self, state: &CreditsState) -> String {
        let balance = match state.credits {
            Some(credits) if credits <= 0 => self.red(&format!("{credits} credits")),
            Some(credits) => self.green(&format!("{} credits", self.format_number(credits as f64))),
            None => self.dim("unknown"),
        };

        let mut lines = vec![format!("{} {}", self.bold("Balance:"), balance)];
        if let Some(ref user) = state.user_id {
            lines.push(format!("User:    {}", self.cyan(user)));
        }
        if let Some(ref error) = state.error {
            lines.push(format!("{} {}", self.yellow("Last error:"), error));
        }
        lines.join("\n")
    }

    /// Formats a freshly generated token.
    pub fn format_generated(&self, token: &TokenInfo) -> String {
        let mut lines = vec![
            self.format_success("Token generated"),
            format!("Token:   {}", self.cyan(&token.token)),
            format!("Credits: {}", token.credits),
            format!("Expires: {}", self.format_expiry(token.expires_at)),
        ];
        if !token.description.is_empty() {
            lines.push(format!("Note:    {}", token.description));
        }
        lines.join("\n")
    }

    /// Formats a token table.
    pub fn format_tokens(&self, tokens: &TokenList) -> String {
        if tokens.is_empty() {
            return self.dim("No tokens");
        }

        let now = Utc::now();
        let mut lines = vec![format!(
            "{:<34} {:>8}  {:<8} {:<18} {}",
            self.bold("Token"),
            self.bold("Credits"),
            self.bold("Status"),
            self.bold("Expires"),
            self.bold("Description")
        )];

        for token in tokens.as_slice() {
            let status = if token.is_used {
                self.dim(&format!("{:<8}", "used"))
            } else if token.is_expired_at(now) {
                self.yellow(&format!("{:<8}", "expired"))
            } else {
                self.green(&format!("{:<8}", "active"))
            };
            lines.push(format!(
                "{:<34} {:>8}  {} {:<18} {}",
                token.token,
                token.credits,
                status,
                self.format_expiry(token.expires_at),
                token.description
            ));
        }

        lines.push(String::new());
        lines.push(self.dim(&format!(
            "{} tokens, {} unused, {} credits outstanding",
            tokens.len(),
            tokens.unused_count(),
            tokens.outstanding_credits()
        )));
        lines.join("\n")
    }

    /// Formats a newly created API key.
    pub fn format_api_key(&self, key: &ApiKeyInfo) -> String {
        let mut lines = vec![self.format_success("API key created")];
        if let Some(ref name) = key.name {
            lines.push(format!("Name: {name}"));
        }
        lines.push(format!("Key:  {}", self.cyan(&key.key)));
        lines.push(self.dim("Store this key now; it is not shown again."));
        lines.join("\n")
    }

    /// Formats expiry as a countdown or absolute date.
    fn format_expiry(&self, expires_at: DateTime<Utc>) -> String {
        let now = Utc::now();
        if expires_at <= now {
            return "expired".to_string();
        }

        let diff = expires_at - now;
        if diff < Duration::hours(1) {
            let mins = diff.num_minutes();
            format!("in {} minute{}", mins, if mins == 1 { "" } else { "s" })
        } else if diff < Duration::hours(24) {
            let hours = diff.num_hours();
            format!("in {} hour{}", hours, if hours == 1 { "" } else { "s" })
        } else if diff < Duration::days(14) {
            let days = diff.num_days();
            format!("in {} day{}", days, if days == 1 { "" } else { "s" })
        } else {
            expires_at
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string()
        }
    }

    // ========================================================================
    // Processing services
    // ========================================================================

    /// Formats a processing service response.
    pub fn format_service(
        &self,
        kind: ServiceKind,
        response: &ServiceResponse,
        balance: Option<i64>,
    ) -> String {
        let mut lines = vec![self.bold(kind.display_name())];

        if let Some(ref status) = response.status {
            lines.push(format!("Status:  {status}"));
        }
        if let Some(verdict) = response.is_match() {
            let text = if verdict {
                self.green("match")
            } else {
                self.red("no match")
            };
            lines.push(format!("Result:  {text}"));
        }
        if let Some(score) = response.score() {
            lines.push(format!("Score:   {score:.3}"));
        }

        let decoded = response.qr_data();
        if kind == ServiceKind::QrExtraction {
            if decoded.is_empty() {
                lines.push(self.dim("No QR codes found"));
            }
            for (i, payload) in decoded.iter().enumerate() {
                lines.push(format!("QR {}:    {}", i + 1, self.cyan(payload)));
            }
        }

        for (key, value) in &response.extra {
            if let Some(summary) = summarize_field(value) {
                lines.push(format!("{} {}", self.dim(&format!("{key}:")), summary));
            }
        }

        if let Some(ref message) = response.message {
            lines.push(message.clone());
        }
        if let Some(ref req_id) = response.req_id {
            lines.push(format!("Request: {}", self.blue(req_id)));
        }
        if let Some(credits) = response.remaining_credits.or(balance) {
            lines.push(format!("Balance: {credits} credits"));
        }

        lines.join("\n")
    }

    // ========================================================================
    // Usage
    // ========================================================================

    /// Formats per-service aggregates.
    pub fn format_usage_stats(&self, stats: &[UsageStat], days: u32) -> String {
        let mut lines = vec![
            self.bold(&format!("Usage, last {days} days")),
            "─".repeat(60),
        ];

        if stats.is_empty() {
            lines.push(self.dim("No calls"));
            return lines.join("\n");
        }

        for stat in stats {
            let rate = stat.success_rate().unwrap_or(100.0);
            lines.push(format!(
                "{:<24} {} {}  {:>6} calls  {:>6} credits  {:>5.0} ms",
                stat.service,
                self.progress_bar(rate),
                self.color_for_percent(rate, &format!("{rate:>5.1}%")),
                self.format_number(stat.total_calls as f64),
                stat.credits_used,
                stat.avg_response_time_ms
            ));
        }

        let totals = UsageTotals::from_stats(stats);
        lines.push(String::new());
        lines.push(self.dim(&format!(
            "{} calls, {} failed, {} credits",
            totals.total_calls, totals.failed_calls, totals.credits_used
        )));
        lines.join("\n")
    }

    /// Formats call history.
    pub fn format_usage_history(&self, records: &[UsageHistoryRecord]) -> String {
        if records.is_empty() {
            return self.dim("No calls");
        }

        let mut lines = vec![format!(
            "{:<20} {:<24} {:>6} {:>8} {:>8}",
            self.bold("Time"),
            self.bold("Service"),
            self.bold("Status"),
            self.bold("Credits"),
            self.bold("ms")
        )];
        for record in records {
            let code = format!("{:>6}", record.status_code);
            let code = if record.is_success() {
                self.green(&code)
            } else {
                self.red(&code)
            };
            lines.push(format!(
                "{:<20} {:<24} {} {:>8} {:>8.0}",
                record
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S"),
                record.service,
                code,
                record.credits_used,
                record.response_time_ms
            ));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Health, settings, errors
    // ========================================================================

    /// Formats a health check.
    pub fn format_health(
        &self,
        status: &HealthStatus,
        base_url: &str,
        elapsed: std::time::Duration,
    ) -> String {
        let verdict = if status.is_healthy() {
            self.green(&status.status)
        } else {
            self.red(&status.status)
        };
        format!(
            "{} {}\n{}",
            self.bold(base_url),
            verdict,
            self.dim(&format!("responded in {} ms", elapsed.as_millis()))
        )
    }

    /// Formats settings, one per line.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let unset = || self.dim("(unset)");
        let mut lines = vec![self.bold("API Console Configuration"), "─".repeat(40)];
        lines.push(format!("api_base_url:         {}", settings.api_base_url));
        lines.push(format!("auth_url:             {}", settings.auth_url));
        lines.push(format!(
            "session_cookie:       {}",
            settings.session_cookie.clone().unwrap_or_else(unset)
        ));
        lines.push(format!(
            "access_token:         {}",
            settings.access_token.clone().unwrap_or_else(unset)
        ));
        lines.push(format!("request_timeout_secs: {}", settings.request_timeout_secs));
        lines.push(format!("health_timeout_secs:  {}", settings.health_timeout_secs));
        lines.push(format!("log_level:            {}", settings.log_level));
        lines.push(format!(
            "export_dir:           {}",
            settings
                .export_dir
                .as_ref()
                .map_or_else(unset, |p| p.display().to_string())
        ));
        lines.join("\n")
    }

    /// Formats an error report with its suggestion.
    pub fn format_error(&self, report: &ErrorReport) -> String {
        let label = match report.status {
            Some(status) => format!("Error ({status})"),
            None => "Error".to_string(),
        };
        let mut lines = vec![format!(
            "{}: {} {}",
            self.red(&label),
            report.message,
            self.dim(&format!("[{}]", report.kind.code()))
        )];
        if !report.suggestion.is_empty() {
            lines.push(format!("  {}", self.dim(&report.suggestion)));
        }
        lines.join("\n")
    }

    /// Formats a one-line confirmation.
    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.green("✓"), message)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent: f64) -> String {
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent, &bar)
    }

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 80.0 {
            self.red(text)
        } else if percent < 95.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn format_number(&self, n: f64) -> String {
        if n >= 1_000_000.0 {
            format!("{:.1}M", n / 1_000_000.0)
        } else if n >= 1_000.0 {
            format!("{:.1}K", n / 1_000.0)
        } else {
            format!("{:.0}", n)
        }
    }

    pub(crate) fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn blue(&self, text: &str) -> String {
        self.paint(BLUE, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// One-line rendering of a scalar response field; images and nested
/// structures are skipped.
fn summarize_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.len() <= 80 => Some(s.clone()),
        Value::String(s) => Some(format!("<{} bytes>", s.len())),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
