//! Domain models for the API console client.
//!
//! ## Submodules
//!
//! - [`auth`] - Bearer tokens (AuthToken)
//! - [`token`] - Credit tokens (TokenInfo, GeneratedToken, TokenList)
//! - [`credits`] - Balance state (CreditsState, CreditBalance)
//! - [`usage`] - Analytics (UsageStat, UsageHistoryRecord)
//! - [`service`] - Processing services and account endpoints

pub mod auth;
pub mod credits;
pub mod service;
pub mod token;
pub mod usage;

pub use auth::{AuthToken, REFRESH_BUFFER_SECS};
pub use credits::{
    CreditBalance, CreditsState, REMAINING_CREDITS_FIELDS, extract_remaining_credits,
};
pub use service::{ApiKeyInfo, HealthStatus, ServiceKind, ServiceResponse};
pub use token::{GeneratedToken, RedeemResult, TokenFilter, TokenInfo, TokenList};
pub use usage::{UsageHistoryRecord, UsageStat, UsageTotals};
