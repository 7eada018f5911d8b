// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # API Console Services
//!
//! Typed backend operations for the API console.
//!
//! Every operation is a method on [`ConsoleApi`]. Inputs are checked
//! before any request is sent; malformed input fails with
//! [`apiconsole_fetch::ApiError::Validation`] and never reaches the network.
//!
//! | Area | Methods |
//! |------|---------|
//! | Tokens | `generate_token`, `delete_token`, `list_tokens`, `redeem_token` |
//! | Credits | `get_balance`, plus [`CreditsService`] |
//! | API keys | `create_api_key` |
//! | QR | `mask_qr`, `extract_qr` |
//! | Faces | `detect_face`, `verify_face` |
//! | Signatures | `verify_signature` |
//! | ID documents | `crop_id` |
//! | Analytics | `usage_stats`, `usage_history` |
//! | Health | `health` |
//!
//! ## Usage
//!
//! ```ignore
//! use apiconsole_fetch::{ApiClient, ApiClientConfig};
//! use apiconsole_services::ConsoleApi;
//!
//! let client = ApiClient::builder(ApiClientConfig::default()).build()?;
//! let api = ConsoleApi::new(client);
//!
//! let result = api.extract_qr(&image_base64).await?;
//! println!("{:?}", result.qr_data());
//! ```

pub mod api;
pub mod api_keys;
pub mod credits;
pub mod export;
pub mod health;
pub mod request_id;
pub mod services;
pub mod tokens;
pub mod usage;
pub mod validation;

pub use api::ConsoleApi;
pub use credits::CreditsService;
pub use export::{
    export_filename, tokens_csv, usage_history_csv, usage_stats_csv, write_csv,
};
pub use tokens::list_endpoint;
pub use usage::{DEFAULT_HISTORY_LIMIT, DEFAULT_STATS_DAYS};
pub use validation::{
    MAX_DESCRIPTION_CHARS, encode_image_bytes, is_display_token, is_redeemable_token,
    strip_data_url_prefix, validate_image, validate_redeem_token,
};
