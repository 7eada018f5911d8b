//! Retry policy for authenticated requests.
//!
//! The only automatic retry is the re-authentication retry: a 401 clears
//! the cached bearer token and the request is sent again with a fresh one.

/// Policy bounding automatic retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How many times a 401 may trigger a token refresh and resend.
    pub max_auth_retries: u32,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_auth_retries` re-authentication retries.
    pub fn new(max_auth_retries: u32) -> Self {
        Self { max_auth_retries }
    }

    /// Disables retries: a 401 fails immediately.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    /// Returns true if another auth retry is allowed after `retries_done`.
    pub fn allows_auth_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_auth_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}
