//! Request error types.

use apiconsole_core::ValidationError;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Longest raw (non-JSON) error body kept in a message.
const MAX_RAW_ERROR_CHARS: usize = 200;

// ============================================================================
// API Error
// ============================================================================

/// Error type for API operations.
///
/// Every variant carries owned data so errors can be stored in call state
/// and handed to several observers.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Input rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Token fetch failed, or a request was still rejected after the auth retry.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Non-2xx response other than 401.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable message taken from the body.
        message: String,
        /// Parsed error body, when it was JSON.
        details: Option<Value>,
    },

    /// The server could not be reached.
    #[error("Network error: unable to reach {base_url} ({message})")]
    Network {
        /// Origin the client was talking to.
        base_url: String,
        /// Transport error text.
        message: String,
    },

    /// A deadline elapsed before the response arrived.
    #[error("Request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client misconfiguration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Authentication(_) => Some(StatusCode::UNAUTHORIZED.as_u16()),
            _ => None,
        }
    }

    /// Structured error body, if the server sent one.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Http { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Builds an error from a non-2xx response body.
    ///
    /// JSON bodies contribute their `message`, `error` or `detail` field;
    /// anything else is used verbatim, truncated.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let details = serde_json::from_str::<Value>(body).ok();

        let from_json = details.as_ref().and_then(|v| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str))
                .map(str::to_string)
        });

        let message = from_json
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| truncate(trimmed, MAX_RAW_ERROR_CHARS))
            })
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        ApiError::Http {
            status: status.as_u16(),
            message,
            details,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
