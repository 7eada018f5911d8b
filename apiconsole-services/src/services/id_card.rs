//! ID document cropping.

use apiconsole_core::{ServiceKind, ServiceResponse};
use apiconsole_fetch::ApiError;
use tracing::instrument;

use super::DOC_FIELD;
use crate::api::ConsoleApi;
use crate::validation::validate_image;

impl ConsoleApi {
    /// Crops an ID document out of a photo.
    #[instrument(skip_all)]
    pub async fn crop_id(&self, image: &str) -> Result<ServiceResponse, ApiError> {
        let image = validate_image(image)?;
        self.submit(ServiceKind::IdCropping, vec![(DOC_FIELD, image)])
            .await
    }
}
