// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # API Console Core
//!
//! Core types and models shared by every API console crate.
//!
//! - Domain models (bearer tokens, credit tokens, balances, usage analytics)
//! - Error types, including the client-side [`ValidationError`]
//!
//! ## Key Types
//!
//! ### Auth
//! - [`AuthToken`] - Bearer token with expiry and refresh buffer
//!
//! ### Credits
//! - [`CreditsState`] - Client view of the balance
//! - [`CreditBalance`] - Balance endpoint body
//! - [`extract_remaining_credits`] - Reads the authoritative balance from any response
//!
//! ### Credit Tokens
//! - [`TokenInfo`] - A listed token
//! - [`GeneratedToken`] / [`RedeemResult`] - Generate and redeem bodies
//! - [`TokenList`] - Displayed list with merge helpers
//!
//! ### Services & Analytics
//! - [`ServiceKind`] / [`ServiceResponse`] - Processing endpoints
//! - [`UsageStat`] / [`UsageHistoryRecord`] - Analytics records

pub mod error;
pub mod models;

pub use error::ValidationError;

pub use models::{
    // Auth
    AuthToken,
    REFRESH_BUFFER_SECS,
    // Credits
    CreditBalance,
    CreditsState,
    REMAINING_CREDITS_FIELDS,
    extract_remaining_credits,
    // Tokens
    GeneratedToken,
    RedeemResult,
    TokenFilter,
    TokenInfo,
    TokenList,
    // Services
    ApiKeyInfo,
    HealthStatus,
    ServiceKind,
    ServiceResponse,
    // Analytics
    UsageHistoryRecord,
    UsageStat,
    UsageTotals,
};
