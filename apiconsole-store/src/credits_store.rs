//! Shared credit balance state.
//!
//! One [`CreditsStore`] is created per session and handed to everything
//! that reads or writes the balance. Clones share state. Writers are the
//! balance fetch, token redemption and the [`CreditsSync`] interceptor;
//! the last write wins.

use apiconsole_core::{CreditsState, extract_remaining_credits};
use apiconsole_fetch::{InterceptedResponse, ResponseInterceptor};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

// ============================================================================
// Credits Store
// ============================================================================

/// Observable credit balance.
#[derive(Clone)]
pub struct CreditsStore {
    inner: Arc<RwLock<CreditsState>>,
    notify: Arc<watch::Sender<u64>>,
    version: Arc<RwLock<u64>>,
}

impl Default for CreditsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(CreditsState::default())),
            notify: Arc::new(notify),
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Returns a copy of the current state.
    pub async fn get_state(&self) -> CreditsState {
        self.inner.read().await.clone()
    }

    /// Current balance, if known.
    pub async fn credits(&self) -> Option<i64> {
        self.inner.read().await.credits
    }

    /// Replaces balance and owner; clears loading and error.
    pub async fn set_credits(&self, credits: i64, user_id: Option<String>) {
        self.mutate(|s| {
            s.credits = Some(credits);
            s.user_id = user_id;
            s.loading = false;
            s.error = None;
        })
        .await;
        info!(credits, "Credits set");
    }

    /// Replaces only the balance.
    pub async fn update_credits(&self, credits: i64) {
        self.mutate(|s| s.credits = Some(credits)).await;
        debug!(credits, "Credits updated");
    }

    /// Marks a balance fetch as started or finished.
    pub async fn set_loading(&self, loading: bool) {
        self.mutate(|s| s.loading = loading).await;
    }

    /// Records a balance fetch failure; the last balance is kept.
    pub async fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        warn!(error = %error, "Credits error");
        self.mutate(|s| {
            s.loading = false;
            s.error = Some(error);
        })
        .await;
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Applies `f`, notifying subscribers only if the state changed.
    async fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut CreditsState),
    {
        let changed = {
            let mut state = self.inner.write().await;
            let before = state.clone();
            f(&mut state);
            *state != before
        };
        if changed {
            self.notify_change().await;
        }
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

// ============================================================================
// Response Interceptor
// ============================================================================

/// Copies server-reported balances into a [`CreditsStore`].
///
/// Any successful response with a numeric `remainingCredits` or
/// `remaining_credits` field updates the balance, whichever endpoint
/// produced it.
pub struct CreditsSync {
    store: CreditsStore,
}

impl CreditsSync {
    /// Creates an interceptor writing into `store`.
    pub fn new(store: CreditsStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResponseInterceptor for CreditsSync {
    fn name(&self) -> &'static str {
        "credits-sync"
    }

    async fn on_response(&self, response: &InterceptedResponse<'_>) {
        if let Some(credits) = extract_remaining_credits(response.body) {
            debug!(endpoint = response.endpoint, credits, "Response carried balance");
            self.store.update_credits(credits).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use apiconsole_fetch::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = CreditsStore::new();
        let state = store.get_state().await;
        assert!(state.credits.is_none());
        assert!(state.user_id.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_set_credits_clears_error_and_loading() {
        let store = CreditsStore::new();
        store.set_loading(true).await;
        store.set_error("offline").await;
        store.set_loading(true).await;

        store.set_credits(120, Some("user-1".to_string())).await;

        let state = store.get_state().await;
        assert_eq!(state.credits, Some(120));
        assert_eq!(state.user_id.as_deref(), Some("user-1"));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_user() {
        let store = CreditsStore::new();
        store.set_credits(10, Some("user-1".to_string())).await;
        store.update_credits(4).await;

        let state = store.get_state().await;
        assert_eq!(state.credits, Some(4));
        assert_eq!(state.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_error_keeps_balance() {
        let store = CreditsStore::new();
        store.set_credits(10, None).await;
        store.set_error("server down").await;

        let state = store.get_state().await;
        assert_eq!(state.credits, Some(10));
        assert_eq!(state.error.as_deref(), Some("server down"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = CreditsStore::new();
        let other = store.clone();
        other.update_credits(77).await;
        assert_eq!(store.credits().await, Some(77));
    }

    #[tokio::test]
    async fn test_subscribers_notified_on_change_only() {
        let store = CreditsStore::new();
        let mut rx = store.subscribe();

        store.update_credits(5).await;
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        store.update_credits(5).await;
        assert!(!rx.has_changed().unwrap());

        store.update_credits(6).await;
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_sync_updates_from_any_endpoint() {
        let store = CreditsStore::new();
        let sync = CreditsSync::new(store.clone());

        let body = json!({"status": "success", "remaining_credits": 31});
        let response = InterceptedResponse {
            method: &Method::POST,
            endpoint: "/face-detect",
            status: StatusCode::OK,
            body: &body,
        };
        sync.on_response(&response).await;
        assert_eq!(store.credits().await, Some(31));

        let body = json!({"tokens": []});
        let response = InterceptedResponse {
            method: &Method::GET,
            endpoint: "/tokens/all",
            status: StatusCode::OK,
            body: &body,
        };
        sync.on_response(&response).await;
        assert_eq!(store.credits().await, Some(31));
    }
}
