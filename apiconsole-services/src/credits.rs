//! Credit balance operations.

use apiconsole_core::{CreditBalance, CreditsState};
use apiconsole_fetch::ApiError;
use apiconsole_store::CreditsStore;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::api::ConsoleApi;

/// Balance endpoint.
const BALANCE_ENDPOINT: &str = "/credits/balance";

impl ConsoleApi {
    /// Fetches the current user's balance.
    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> Result<CreditBalance, ApiError> {
        let balance: CreditBalance = self.client().get(BALANCE_ENDPOINT).await?;
        debug!(credits = balance.credits, "Balance fetched");
        Ok(balance)
    }
}

// ============================================================================
// Credits Service
// ============================================================================

/// Balance workflows on top of a [`CreditsStore`].
///
/// The client handed in should have a [`apiconsole_store::CreditsSync`]
/// registered so that every response keeps the store current.
#[derive(Clone)]
pub struct CreditsService {
    api: ConsoleApi,
    store: CreditsStore,
}

impl CreditsService {
    /// Creates a service writing into `store`.
    pub fn new(api: ConsoleApi, store: CreditsStore) -> Self {
        Self { api, store }
    }

    /// Reloads the balance from the backend.
    ///
    /// On failure the store keeps its previous balance and records the error.
    pub async fn refresh(&self) -> Result<CreditBalance, ApiError> {
        self.store.set_loading(true).await;

        match self.api.get_balance().await {
            Ok(balance) => {
                self.store
                    .set_credits(balance.credits, balance.user_id.clone())
                    .await;
                Ok(balance)
            }
            Err(e) => {
                self.store.set_error(e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Redeems `token` and returns a confirmation message.
    pub async fn redeem(&self, token: &str) -> Result<String, ApiError> {
        let result = self.api.redeem_token(token).await?;

        let balance = match result.remaining_credits {
            Some(credits) => {
                self.store.update_credits(credits).await;
                Some(credits)
            }
            None => match self.refresh().await {
                Ok(balance) => Some(balance.credits),
                Err(e) => {
                    warn!(error = %e, "Balance refresh after redemption failed");
                    None
                }
            },
        };

        Ok(redeem_message(result.credits_added, balance))
    }

    /// Current balance state.
    pub async fn state(&self) -> CreditsState {
        self.store.get_state().await
    }

    /// Subscribes to balance changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// The backing store.
    pub fn store(&self) -> &CreditsStore {
        &self.store
    }
}

fn redeem_message(credits_added: Option<i64>, balance: Option<i64>) -> String {
    match (credits_added, balance) {
        (Some(added), Some(balance)) => {
            format!("Token redeemed: {added} credits added. New balance: {balance} credits")
        }
        (None, Some(balance)) => format!("Token redeemed. New balance: {balance} credits"),
        (Some(added), None) => format!("Token redeemed: {added} credits added."),
        (None, None) => "Token redeemed.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeem_message() {
        assert_eq!(
            redeem_message(None, Some(500)),
            "Token redeemed. New balance: 500 credits"
        );
        assert_eq!(
            redeem_message(Some(100), Some(600)),
            "Token redeemed: 100 credits added. New balance: 600 credits"
        );
        assert_eq!(redeem_message(None, None), "Token redeemed.");
    }
}
