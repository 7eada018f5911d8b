//! QR masking and extraction.

use apiconsole_core::{ServiceKind, ServiceResponse};
use apiconsole_fetch::ApiError;
use tracing::instrument;

use super::QR_FIELD;
use crate::api::ConsoleApi;
use crate::validation::validate_image;

impl ConsoleApi {
    /// Masks QR codes in an image.
    #[instrument(skip_all)]
    pub async fn mask_qr(&self, image: &str) -> Result<ServiceResponse, ApiError> {
        let image = validate_image(image)?;
        self.submit(ServiceKind::QrMasking, vec![(QR_FIELD, image)])
            .await
    }

    /// Decodes QR codes in an image.
    #[instrument(skip_all)]
    pub async fn extract_qr(&self, image: &str) -> Result<ServiceResponse, ApiError> {
        let image = validate_image(image)?;
        self.submit(ServiceKind::QrExtraction, vec![(QR_FIELD, image)])
            .await
    }
}
