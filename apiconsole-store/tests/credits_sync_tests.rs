//! End-to-end balance propagation through the request executor.

use apiconsole_fetch::{ApiClient, ApiClientConfig, StaticTokenSource};
use apiconsole_store::{ApiCall, CallStatus, CreditsStore, CreditsSync};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, credits: &CreditsStore) -> ApiClient {
    ApiClient::builder(ApiClientConfig::new(server.uri()))
        .token_source(Arc::new(StaticTokenSource::new("test-token")))
        .interceptor(Arc::new(CreditsSync::new(credits.clone())))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_remaining_credits_camel_case_updates_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/face-detect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "remainingCredits": 42})),
        )
        .mount(&server)
        .await;

    let credits = CreditsStore::new();
    let client = client_for(&server, &credits);

    let _: Value = client
        .post("/face-detect", &json!({"doc_base64": "aGk="}))
        .await
        .unwrap();

    assert_eq!(credits.credits().await, Some(42));
}

#[tokio::test]
async fn test_remaining_credits_snake_case_updates_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/usage/stats"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"stats": [], "remaining_credits": 7})),
        )
        .mount(&server)
        .await;

    let credits = CreditsStore::new();
    credits.set_credits(100, Some("user-1".to_string())).await;
    let client = client_for(&server, &credits);

    let _: Value = client.get("/usage/stats").await.unwrap();

    let state = credits.get_state().await;
    assert_eq!(state.credits, Some(7));
    assert_eq!(state.user_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn test_error_response_leaves_balance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(402)
                .set_body_json(json!({"message": "Insufficient credits", "remainingCredits": 0})),
        )
        .mount(&server)
        .await;

    let credits = CreditsStore::new();
    credits.update_credits(3).await;
    let client = client_for(&server, &credits);

    let result: Result<Value, _> = client.post("/qr-masking", &json!({})).await;
    assert!(result.is_err());
    assert_eq!(credits.credits().await, Some(3));
}

#[tokio::test]
async fn test_api_call_records_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let credits = CreditsStore::new();
    let client = client_for(&server, &credits);
    let call = ApiCall::new(move |endpoint: String| {
        let client = client.clone();
        async move { client.get::<Value>(&endpoint).await }
    });

    let _ = call.execute("/credits/balance".to_string()).await;

    let state = call.state().await;
    assert_eq!(state.status, CallStatus::Error);
    assert_eq!(state.error.as_deref(), Some("maintenance"));
    assert_eq!(state.error_details.unwrap().status, Some(503));
}
