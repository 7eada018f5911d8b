//! JSON output formatting.

use anyhow::Result;
use apiconsole_core::{ServiceKind, ServiceResponse, TokenFilter, TokenInfo, TokenList};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a processing call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOutput<'a> {
    pub service: ServiceKind,
    pub display_name: &'static str,
    pub response: &'a ServiceResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

impl<'a> ServiceOutput<'a> {
    /// Wraps a response; `balance` is the store's balance after the call.
    pub fn new(kind: ServiceKind, response: &'a ServiceResponse, balance: Option<i64>) -> Self {
        Self {
            service: kind,
            display_name: kind.display_name(),
            response,
            balance: response.remaining_credits.or(balance),
        }
    }
}

/// JSON output for a token listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListOutput<'a> {
    pub filter: TokenFilter,
    pub count: usize,
    pub unused_count: usize,
    pub outstanding_credits: i64,
    pub tokens: &'a [TokenInfo],
}

impl<'a> TokenListOutput<'a> {
    /// Summarizes `tokens`.
    pub fn new(filter: TokenFilter, tokens: &'a TokenList) -> Self {
        Self {
            filter,
            count: tokens.len(),
            unused_count: tokens.unused_count(),
            outstanding_credits: tokens.outstanding_credits(),
            tokens: tokens.as_slice(),
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
