//! Image processing services.
//!
//! Every processing call validates its images, tags the request with a
//! fresh `req_id` and posts a flat JSON object:
//!
//! ```text
//! POST /face-verification
//! {"doc_base64_1": "...", "doc_base64_2": "...", "req_id": "face-verify-1718000000000-x8k2m0q1z"}
//! ```

mod face;
mod id_card;
mod qr;
mod signature;

use apiconsole_core::{ServiceKind, ServiceResponse};
use apiconsole_fetch::ApiError;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::ConsoleApi;
use crate::request_id;

/// Body field for single-image QR services.
pub(crate) const QR_FIELD: &str = "base64_str";

/// Body field for single-document services.
pub(crate) const DOC_FIELD: &str = "doc_base64";

/// Body fields for two-image comparisons.
pub(crate) const PAIR_FIELDS: [&str; 2] = ["doc_base64_1", "doc_base64_2"];

/// Body field carrying the correlation id.
pub(crate) const REQ_ID_FIELD: &str = "req_id";

impl ConsoleApi {
    /// Posts already-validated images to `kind`'s endpoint.
    async fn submit(
        &self,
        kind: ServiceKind,
        images: Vec<(&'static str, String)>,
    ) -> Result<ServiceResponse, ApiError> {
        let req_id = request_id::generate(kind.request_prefix());

        let mut body = Map::new();
        for (field, payload) in images {
            body.insert(field.to_string(), Value::String(payload));
        }
        body.insert(REQ_ID_FIELD.to_string(), Value::String(req_id.clone()));

        debug!(service = kind.display_name(), req_id = %req_id, "Submitting to service");
        let response: ServiceResponse = self.client().post(kind.endpoint(), &body).await?;

        info!(
            service = kind.display_name(),
            req_id = %req_id,
            status = ?response.status,
            "Service call completed"
        );
        Ok(response)
    }
}
