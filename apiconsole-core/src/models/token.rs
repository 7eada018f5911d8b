//! Credit token types.
//!
//! A credit token is a one-time code minted by an admin. Redeeming it adds
//! its credit amount to the redeemer's balance and flips `is_used`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credits::whole_number_opt;

// ============================================================================
// Token Info
// ============================================================================

/// A credit token as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Server-side identifier.
    pub id: String,
    /// The token text.
    pub token: String,
    /// Credits granted on redemption.
    pub credits: i64,
    /// User id of the admin who minted it.
    #[serde(default)]
    pub created_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has been redeemed.
    #[serde(default)]
    pub is_used: bool,
    /// Redeeming user, once used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_by: Option<String>,
    /// Redemption time, once used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    /// Admin-supplied description.
    #[serde(default)]
    pub description: String,
}

impl TokenInfo {
    /// Builds the displayed record for a freshly generated token.
    ///
    /// The generate endpoint only echoes part of the record; the rest is
    /// filled in locally. A new token is never used.
    pub fn from_generated(generated: GeneratedToken, created_by: Option<&str>) -> Self {
        Self {
            id: generated.id.unwrap_or_else(|| generated.token.clone()),
            token: generated.token,
            credits: generated.credits,
            created_by: created_by.unwrap_or_default().to_string(),
            created_at: generated.created_at.unwrap_or_else(Utc::now),
            expires_at: generated.expires_at,
            is_used: false,
            used_by: None,
            used_at: None,
            description: generated.description.unwrap_or_default(),
        }
    }

    /// Returns true if the token expired before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Returns true if the token can still be redeemed.
    pub fn is_redeemable(&self) -> bool {
        !self.is_used && !self.is_expired_at(Utc::now())
    }
}

/// Body returned by the generate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedToken {
    /// Server id, when the backend returns one.
    #[serde(default)]
    pub id: Option<String>,
    /// The token text.
    pub token: String,
    /// Credits granted.
    pub credits: i64,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Creation time, when echoed.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Description, when echoed.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body returned by the redeem endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResult {
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Credits added by this redemption.
    #[serde(
        default,
        alias = "credits_added",
        alias = "credits",
        deserialize_with = "whole_number_opt"
    )]
    pub credits_added: Option<i64>,
    /// Balance after redemption.
    #[serde(default, alias = "remaining_credits", deserialize_with = "whole_number_opt")]
    pub remaining_credits: Option<i64>,
}

// ============================================================================
// Listing
// ============================================================================

/// Which token listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFilter {
    /// Tokens minted by the current user.
    #[default]
    Mine,
    /// Every token (admin).
    All,
    /// Redeemed tokens.
    Used,
    /// Tokens not yet redeemed.
    Unused,
}

impl TokenFilter {
    /// All filters.
    pub fn all() -> &'static [TokenFilter] {
        &[
            TokenFilter::Mine,
            TokenFilter::All,
            TokenFilter::Used,
            TokenFilter::Unused,
        ]
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenFilter::Mine => "mine",
            TokenFilter::All => "all",
            TokenFilter::Used => "used",
            TokenFilter::Unused => "unused",
        }
    }

    /// Parses a lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

/// A displayed list of tokens, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenList {
    tokens: Vec<TokenInfo>,
}

impl TokenList {
    /// Wraps a fetched list.
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Self { tokens }
    }

    /// Adds a new token at the top of the list.
    pub fn prepend(&mut self, token: TokenInfo) {
        self.tokens.insert(0, token);
    }

    /// Removes a token by id, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<TokenInfo> {
        let idx = self.tokens.iter().position(|t| t.id == id)?;
        Some(self.tokens.remove(idx))
    }

    /// Looks a token up by id.
    pub fn get(&self, id: &str) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// Number of tokens not yet redeemed.
    pub fn unused_count(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_used).count()
    }

    /// Sum of credits across unredeemed tokens.
    pub fn outstanding_credits(&self) -> i64 {
        self.tokens
            .iter()
            .filter(|t| !t.is_used)
            .map(|t| t.credits)
            .sum()
    }

    /// Tokens in display order.
    pub fn as_slice(&self) -> &[TokenInfo] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<Vec<TokenInfo>> for TokenList {
    fn from(tokens: Vec<TokenInfo>) -> Self {
        Self::new(tokens)
    }
}

impl IntoIterator for TokenList {
    type Item = TokenInfo;
    type IntoIter = std::vec::IntoIter<TokenInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}
