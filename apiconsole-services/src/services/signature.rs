//! Signature verification.

use apiconsole_core::{ServiceKind, ServiceResponse};
use apiconsole_fetch::ApiError;
use tracing::instrument;

use super::PAIR_FIELDS;
use crate::api::ConsoleApi;
use crate::validation::validate_images;

impl ConsoleApi {
    /// Compares two signature images.
    ///
    /// Exactly two images are required; any other count fails without a
    /// request.
    #[instrument(skip_all, fields(count = images.len()))]
    pub async fn verify_signature(&self, images: &[String]) -> Result<ServiceResponse, ApiError> {
        let images = validate_images(images, PAIR_FIELDS.len())?;
        let fields = PAIR_FIELDS.into_iter().zip(images).collect();
        self.submit(ServiceKind::SignatureVerification, fields)
            .await
    }
}
