//! Error classification for display.
//!
//! Classification reads the error variant and HTTP status captured at the
//! transport layer. It never inspects rendered message text.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Coarse error category shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad input caught before any request.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Authentication failed.
    #[serde(rename = "AUTH_ERROR")]
    Auth,
    /// Endpoint or resource not found.
    NotFound,
    /// 5xx from the backend.
    #[serde(rename = "SERVER_ERROR")]
    Server,
    /// Connectivity failure or timeout.
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// Anything else.
    #[serde(rename = "UNKNOWN_ERROR")]
    Unclassified,
}

impl ErrorKind {
    /// Stable code string.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Auth => "AUTH_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Unclassified => "UNKNOWN_ERROR",
        }
    }

    /// Fixed user-facing suggestion.
    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::Validation => {
                "Check the input: images must be valid base64 and tokens must match the expected format."
            }
            ErrorKind::Auth => "Your session may have expired. Please sign in again.",
            ErrorKind::NotFound => {
                "The endpoint or service may be unavailable. Please try again later."
            }
            ErrorKind::Server => "The server encountered an error. Please try again in a moment.",
            ErrorKind::Network => {
                "Check your internet connection and make sure the API server is running."
            }
            ErrorKind::Unclassified => "An unexpected error occurred. Please try again.",
        }
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Server | ErrorKind::Network)
    }
}

impl ApiError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Authentication(_) => ErrorKind::Auth,
            ApiError::Network { .. } | ApiError::Timeout(_) => ErrorKind::Network,
            ApiError::Http { status, .. } => match *status {
                401 => ErrorKind::Auth,
                404 => ErrorKind::NotFound,
                500..=599 => ErrorKind::Server,
                _ => ErrorKind::Unclassified,
            },
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) | ApiError::Config(_) => {
                ErrorKind::Unclassified
            }
        }
    }

    /// Builds the display report for this error.
    pub fn report(&self) -> ErrorReport {
        let kind = self.kind();
        ErrorReport {
            kind,
            status: self.status(),
            message: self.to_string(),
            suggestion: kind.suggestion().to_string(),
            details: self.details().cloned(),
        }
    }
}

/// Structured error value handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Category.
    pub kind: ErrorKind,
    /// HTTP status, when one was involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
    /// What the user can do about it.
    pub suggestion: String,
    /// Server error body, when JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&ApiError> for ErrorReport {
    fn from(err: &ApiError) -> Self {
        err.report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiconsole_core::ValidationError;
    use std::time::Duration;

    fn http(status: u16) -> ApiError {
        ApiError::Http {
            status,
            message: "boom".to_string(),
            details: None,
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(http(500).kind(), ErrorKind::Server);
        assert_eq!(http(503).kind(), ErrorKind::Server);
        assert_eq!(http(404).kind(), ErrorKind::NotFound);
        assert_eq!(http(401).kind(), ErrorKind::Auth);
        assert_eq!(http(409).kind(), ErrorKind::Unclassified);
    }

    #[test]
    fn test_variant_classification() {
        let net = ApiError::Network {
            base_url: "http://localhost:8000".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(net.kind(), ErrorKind::Network);
        assert_eq!(ApiError::Timeout(Duration::from_secs(10)).kind(), ErrorKind::Network);
        assert_eq!(
            ApiError::Authentication("nope".to_string()).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            ApiError::from(ValidationError::EmptyImage).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ApiError::InvalidResponse("x".to_string()).kind(),
            ErrorKind::Unclassified
        );
    }

    #[test]
    fn test_message_text_does_not_affect_kind() {
        let err = ApiError::Http {
            status: 400,
            message: "500 Internal Server Error: network unreachable".to_string(),
            details: None,
        };
        assert_eq!(err.kind(), ErrorKind::Unclassified);
    }

    #[test]
    fn test_report_fields() {
        let report = http(502).report();
        assert_eq!(report.kind, ErrorKind::Server);
        assert_eq!(report.status, Some(502));
        assert_eq!(report.message, "boom");
        assert_eq!(report.suggestion, ErrorKind::Server.suggestion());
    }

    #[test]
    fn test_kind_serializes_as_code() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::Auth,
            ErrorKind::NotFound,
            ErrorKind::Server,
            ErrorKind::Network,
            ErrorKind::Unclassified,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Server.is_retryable());
        assert!(ErrorKind::Network.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::Auth.is_retryable());
    }
}
