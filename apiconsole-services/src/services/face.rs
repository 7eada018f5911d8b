//! Face detection and verification.

use apiconsole_core::{ServiceKind, ServiceResponse};
use apiconsole_fetch::ApiError;
use tracing::instrument;

use super::{DOC_FIELD, PAIR_FIELDS};
use crate::api::ConsoleApi;
use crate::validation::validate_image;

impl ConsoleApi {
    /// Detects faces in an image.
    #[instrument(skip_all)]
    pub async fn detect_face(&self, image: &str) -> Result<ServiceResponse, ApiError> {
        let image = validate_image(image)?;
        self.submit(ServiceKind::FaceDetect, vec![(DOC_FIELD, image)])
            .await
    }

    /// Checks whether two images show the same face.
    #[instrument(skip_all)]
    pub async fn verify_face(
        &self,
        first: &str,
        second: &str,
    ) -> Result<ServiceResponse, ApiError> {
        let first = validate_image(first)?;
        let second = validate_image(second)?;
        self.submit(
            ServiceKind::FaceVerification,
            vec![(PAIR_FIELDS[0], first), (PAIR_FIELDS[1], second)],
        )
        .await
    }
}
