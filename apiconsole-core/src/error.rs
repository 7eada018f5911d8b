//! Validation errors for the API console client.

use thiserror::Error;

/// Malformed input caught client-side.
///
/// These are never retried: the same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The image payload was empty after stripping the data URL prefix.
    #[error("Image data is empty")]
    EmptyImage,

    /// The image payload is not valid base64.
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// Wrong number of images for an operation.
    #[error("Expected exactly {expected} images, got {actual}")]
    ImageCount {
        /// Required image count.
        expected: usize,
        /// Number of images supplied.
        actual: usize,
    },

    /// Redeem token does not match the 32 lowercase hex format.
    #[error("Invalid token format: expected 32 lowercase hexadecimal characters")]
    TokenFormat,

    /// Credit amount outside the accepted range.
    #[error("Invalid credit amount: {0} (must be greater than zero)")]
    CreditAmount(i64),

    /// Free-text field exceeds its maximum length.
    #[error("{field} is too long: {len} characters (max {max})")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Actual length.
        len: usize,
        /// Maximum length.
        max: usize,
    },

    /// A required field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
