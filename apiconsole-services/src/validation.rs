//! Input checks applied before any request is sent.

use apiconsole_core::ValidationError;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Patterns
// ============================================================================

/// Leading `data:image/...;base64,` header of a data URL.
static DATA_URL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/[^;,]*;base64,").expect("Invalid regex")
});

/// Token accepted by the redeem endpoint.
static REDEEM_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{32}$").expect("Invalid regex"));

/// Token text shown to the user after generation.
static DISPLAY_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TK_[a-zA-Z0-9]{33}$").expect("Invalid regex"));

/// Standard alphabet; accepts input with or without padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Longest accepted token description.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

// ============================================================================
// Images
// ============================================================================

/// Removes a leading data URL header, if any.
///
/// Applying it twice gives the same result as applying it once.
pub fn strip_data_url_prefix(input: &str) -> &str {
    let mut rest = input;
    while let Some(m) = DATA_URL_PREFIX_RE.find(rest) {
        rest = &rest[m.end()..];
    }
    rest
}

/// Normalizes and checks an image payload.
///
/// Strips any data URL header and embedded whitespace, then requires a
/// non-empty, decodable base64 body. Returns the normalized payload.
pub fn validate_image(input: &str) -> Result<String, ValidationError> {
    let payload: String = strip_data_url_prefix(input.trim())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if payload.is_empty() {
        return Err(ValidationError::EmptyImage);
    }

    LENIENT_BASE64
        .decode(payload.as_bytes())
        .map_err(|e| ValidationError::InvalidImage(e.to_string()))?;

    Ok(payload)
}

/// Validates exactly `expected` images.
pub fn validate_images(images: &[String], expected: usize) -> Result<Vec<String>, ValidationError> {
    if images.len() != expected {
        return Err(ValidationError::ImageCount {
            expected,
            actual: images.len(),
        });
    }
    images.iter().map(|i| validate_image(i)).collect()
}

/// Encodes raw image bytes as standard padded base64.
pub fn encode_image_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

// ============================================================================
// Tokens
// ============================================================================

/// True for text in the redeemable token format.
pub fn is_redeemable_token(token: &str) -> bool {
    REDEEM_TOKEN_RE.is_match(token)
}

/// True for text in the display token format.
pub fn is_display_token(token: &str) -> bool {
    DISPLAY_TOKEN_RE.is_match(token)
}

/// Checks a token before redemption.
///
/// Surrounding whitespace is ignored; case is not.
pub fn validate_redeem_token(token: &str) -> Result<&str, ValidationError> {
    let token = token.trim();
    if is_redeemable_token(token) {
        Ok(token)
    } else {
        Err(ValidationError::TokenFormat)
    }
}

/// Checks token generation parameters.
pub fn validate_generate(credits: i64, description: Option<&str>) -> Result<(), ValidationError> {
    if credits <= 0 {
        return Err(ValidationError::CreditAmount(credits));
    }
    if let Some(description) = description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::TooLong {
                field: "description",
                len,
                max: MAX_DESCRIPTION_CHARS,
            });
        }
    }
    Ok(())
}

/// Checks a required free-text field and returns it trimmed.
pub fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
