//! Bearer token types.

use chrono::{DateTime, Duration, TimeDelta, Utc};
use std::fmt;

/// Seconds before expiry at which a cached token stops being handed out.
pub const REFRESH_BUFFER_SECS: i64 = 300;

/// A bearer token with its absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Token value sent in the `Authorization` header.
    pub value: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Creates a token expiring `expires_in_secs` seconds from now.
    ///
    /// Returns `None` when the expiry is not representable.
    pub fn from_expires_in(value: impl Into<String>, expires_in_secs: i64) -> Option<Self> {
        Self::issued_at(value, Utc::now(), expires_in_secs)
    }

    /// Creates a token issued at `now` and valid for `expires_in_secs`.
    ///
    /// Returns `None` when the expiry is not representable.
    pub fn issued_at(
        value: impl Into<String>,
        now: DateTime<Utc>,
        expires_in_secs: i64,
    ) -> Option<Self> {
        let lifetime = TimeDelta::try_seconds(expires_in_secs)?;
        Some(Self {
            value: value.into(),
            expires_at: now.checked_add_signed(lifetime)?,
        })
    }

    /// Returns true if the token may be handed out at `now`.
    ///
    /// A token inside the refresh buffer counts as unusable.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .checked_sub_signed(Duration::seconds(REFRESH_BUFFER_SECS))
            .is_some_and(|edge| now < edge)
    }

    /// Returns true if the token may be handed out right now.
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// Expiry as milliseconds since the Unix epoch.
    pub fn expires_at_epoch_ms(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }
}

// Keep the secret out of logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
