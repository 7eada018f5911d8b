//! Responses from the processing services and account endpoints.
//!
//! Processing endpoints return loosely shaped JSON that varies per service,
//! so [`ServiceResponse`] keeps the common fields typed and everything else
//! in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Processing Services
// ============================================================================

/// The processing services the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Mask QR codes in an image.
    QrMasking,
    /// Decode QR codes from an image.
    QrExtraction,
    /// Crop an ID document.
    IdCropping,
    /// Compare two signatures.
    SignatureVerification,
    /// Detect faces.
    FaceDetect,
    /// Compare two faces.
    FaceVerification,
}

impl ServiceKind {
    /// All services.
    pub fn all() -> &'static [ServiceKind] {
        &[
            ServiceKind::QrMasking,
            ServiceKind::QrExtraction,
            ServiceKind::IdCropping,
            ServiceKind::SignatureVerification,
            ServiceKind::FaceDetect,
            ServiceKind::FaceVerification,
        ]
    }

    /// Endpoint path relative to the base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ServiceKind::QrMasking => "/qr-masking",
            ServiceKind::QrExtraction => "/qr-extraction",
            ServiceKind::IdCropping => "/id-cropping",
            ServiceKind::SignatureVerification => "/signature-verification",
            ServiceKind::FaceDetect => "/face-detect",
            ServiceKind::FaceVerification => "/face-verification",
        }
    }

    /// Prefix used for generated request ids.
    pub fn request_prefix(&self) -> &'static str {
        match self {
            ServiceKind::QrMasking => "qr-mask",
            ServiceKind::QrExtraction => "qr-extract",
            ServiceKind::IdCropping => "id-crop",
            ServiceKind::SignatureVerification => "sig-verify",
            ServiceKind::FaceDetect => "face-detect",
            ServiceKind::FaceVerification => "face-verify",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::QrMasking => "QR Masking",
            ServiceKind::QrExtraction => "QR Extraction",
            ServiceKind::IdCropping => "ID Cropping",
            ServiceKind::SignatureVerification => "Signature Verification",
            ServiceKind::FaceDetect => "Face Detection",
            ServiceKind::FaceVerification => "Face Verification",
        }
    }
}

/// Response from a processing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    /// Echoed correlation id.
    #[serde(default, alias = "reqId", skip_serializing_if = "Option::is_none")]
    pub req_id: Option<String>,
    /// Status string (`success`, `error`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Balance after the charge.
    #[serde(
        default,
        rename = "remainingCredits",
        alias = "remaining_credits",
        skip_serializing_if = "Option::is_none"
    )]
    pub remaining_credits: Option<i64>,
    /// Service-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceResponse {
    /// Looks up a service-specific field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Match verdict for verification services.
    pub fn is_match(&self) -> Option<bool> {
        ["match", "is_match", "isMatch", "verified"]
            .iter()
            .find_map(|k| self.extra.get(*k).and_then(Value::as_bool))
    }

    /// Similarity or confidence score, when present.
    pub fn score(&self) -> Option<f64> {
        ["similarity", "score", "confidence"]
            .iter()
            .find_map(|k| self.extra.get(*k).and_then(Value::as_f64))
    }

    /// Decoded QR payloads, when present.
    pub fn qr_data(&self) -> Vec<String> {
        let Some(value) = ["qr_data", "data", "decoded"]
            .iter()
            .find_map(|k| self.extra.get(*k))
        else {
            return Vec::new();
        };
        match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Account Endpoints
// ============================================================================

/// A newly created API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyInfo {
    /// Key id.
    #[serde(default)]
    pub id: Option<String>,
    /// The key itself. Only returned once.
    #[serde(alias = "apiKey", alias = "api_key")]
    pub key: String,
    /// Label supplied at creation.
    #[serde(default)]
    pub name: Option<String>,
    /// Creation time.
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response from the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Reported status.
    #[serde(default)]
    pub status: String,
    /// Anything else the backend reports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HealthStatus {
    /// Returns true if the backend reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up" | "pass"
        )
    }
}
