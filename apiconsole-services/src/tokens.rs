//! Credit token operations.

use apiconsole_core::{GeneratedToken, RedeemResult, TokenFilter, TokenInfo, TokenList};
use apiconsole_fetch::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::api::{ConsoleApi, list_from_value};
use crate::validation::{require_non_empty, validate_generate, validate_redeem_token};

// ============================================================================
// Constants
// ============================================================================

/// Token generation endpoint.
const GENERATE_ENDPOINT: &str = "/tokens/generate";

/// Token redemption endpoint.
const REDEEM_ENDPOINT: &str = "/tokens/redeem";

/// Anchor for building single-token paths; only the path part is used.
const TOKEN_PATH_ANCHOR: &str = "http://localhost/tokens";

/// Keys a wrapped token list may sit under.
const LIST_KEYS: &[&str] = &["tokens", "data", "items"];

/// Listing endpoint for a filter.
pub fn list_endpoint(filter: TokenFilter) -> &'static str {
    match filter {
        TokenFilter::Mine => "/tokens/my-tokens",
        TokenFilter::All => "/tokens/all",
        TokenFilter::Used => "/tokens/used",
        TokenFilter::Unused => "/tokens/unused",
    }
}

/// Endpoint for a single token, with `id` percent-encoded as one path segment.
pub fn token_endpoint(id: &str) -> Result<String, ApiError> {
    let mut url = Url::parse(TOKEN_PATH_ANCHOR).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidRequest("token path cannot take segments".to_string()))?
        .push(id);
    Ok(url.path().to_string())
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    credits: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RedeemRequest<'a> {
    token: &'a str,
}

/// The generate endpoint returns the token bare or under `token`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Wrapped { token: GeneratedToken },
    Bare(GeneratedToken),
}

impl From<GenerateResponse> for GeneratedToken {
    fn from(response: GenerateResponse) -> Self {
        match response {
            GenerateResponse::Wrapped { token } | GenerateResponse::Bare(token) => token,
        }
    }
}

// ============================================================================
// Operations
// ============================================================================

impl ConsoleApi {
    /// Mints a token worth `credits`.
    #[instrument(skip(self, description))]
    pub async fn generate_token(
        &self,
        credits: i64,
        description: Option<&str>,
    ) -> Result<GeneratedToken, ApiError> {
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        validate_generate(credits, description)?;

        let response: GenerateResponse = self
            .client()
            .post(
                GENERATE_ENDPOINT,
                &GenerateRequest {
                    credits,
                    description,
                },
            )
            .await?;

        let generated = GeneratedToken::from(response);
        info!(credits = generated.credits, "Token generated");
        Ok(generated)
    }

    /// Deletes a token by id.
    #[instrument(skip(self))]
    pub async fn delete_token(&self, id: &str) -> Result<(), ApiError> {
        let id = require_non_empty("token id", id)?;
        let endpoint = token_endpoint(id)?;

        let _: Value = self.client().delete(&endpoint).await?;
        info!("Token deleted");
        Ok(())
    }

    /// Lists tokens matching `filter`.
    #[instrument(skip(self))]
    pub async fn list_tokens(&self, filter: TokenFilter) -> Result<TokenList, ApiError> {
        let body: Value = self.client().get(list_endpoint(filter)).await?;
        let tokens: Vec<TokenInfo> = list_from_value(body, LIST_KEYS)?;
        debug!(count = tokens.len(), "Tokens listed");
        Ok(TokenList::new(tokens))
    }

    /// Redeems a token for the current user.
    ///
    /// The token must be 32 lowercase hex characters; anything else is
    /// rejected without a request.
    #[instrument(skip(self, token))]
    pub async fn redeem_token(&self, token: &str) -> Result<RedeemResult, ApiError> {
        let token = validate_redeem_token(token)?;

        let result: RedeemResult = self
            .client()
            .post(REDEEM_ENDPOINT, &RedeemRequest { token })
            .await?;

        info!(
            credits_added = ?result.credits_added,
            remaining = ?result.remaining_credits,
            "Token redeemed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_endpoints() {
        assert_eq!(list_endpoint(TokenFilter::Mine), "/tokens/my-tokens");
        assert_eq!(list_endpoint(TokenFilter::All), "/tokens/all");
        assert_eq!(list_endpoint(TokenFilter::Used), "/tokens/used");
        assert_eq!(list_endpoint(TokenFilter::Unused), "/tokens/unused");
    }

    #[test]
    fn test_token_endpoint_encodes_path_segment() {
        assert_eq!(token_endpoint("abc-123").unwrap(), "/tokens/abc-123");
        assert_eq!(token_endpoint("a b").unwrap(), "/tokens/a%20b");
        assert_eq!(token_endpoint("x/y?z#w").unwrap(), "/tokens/x%2Fy%3Fz%23w");
        assert!(!token_endpoint("a b+c").unwrap().contains("a+b"));
    }

    #[test]
    fn test_generate_response_shapes() {
        let bare = json!({
            "token": "TK_abc",
            "credits": 100,
            "expiresAt": "2030-01-01T00:00:00Z"
        });
        let wrapped = json!({"token": bare.clone(), "message": "ok"});

        let a: GeneratedToken = serde_json::from_value::<GenerateResponse>(bare)
            .unwrap()
            .into();
        let b: GeneratedToken = serde_json::from_value::<GenerateResponse>(wrapped)
            .unwrap()
            .into();

        assert_eq!(a, b);
        assert_eq!(a.token, "TK_abc");
    }

    #[test]
    fn test_generate_request_omits_empty_description() {
        let body = serde_json::to_value(GenerateRequest {
            credits: 5,
            description: None,
        })
        .unwrap();
        assert_eq!(body, json!({"credits": 5}));
    }
}
