//! Authenticated request executor.
//!
//! [`ApiClient`] is the single path every domain call takes to the backend:
//!
//! 1. get a bearer token from the [`AuthTokenCache`]
//! 2. send the request with `Authorization` and JSON content type
//! 3. on 401, clear the token and resend, at most
//!    [`RetryPolicy::max_auth_retries`] times
//! 4. turn other non-2xx responses into [`ApiError::Http`]
//! 5. parse the body and run every registered [`ResponseInterceptor`]
//! 6. deserialize into the caller's type

use reqwest::{Client, Method, StatusCode, header, header::HeaderMap, header::HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AuthTokenCache, HttpTokenSource, TokenSource};
use crate::config::ApiClientConfig;
use crate::error::ApiError;
use crate::interceptor::{InterceptedResponse, ResponseInterceptor};
use crate::retry::RetryPolicy;

/// User agent string.
const USER_AGENT: &str = concat!("apiconsole/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request Options
// ============================================================================

/// Per-request extras merged over the defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; these override the defaults on conflict.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<Value>,
    /// Query parameters.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("failed to encode body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ============================================================================
// API Client
// ============================================================================

struct ClientInner {
    http: Client,
    config: ApiClientConfig,
    auth: AuthTokenCache,
    retry: RetryPolicy,
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

/// Authenticated client for the backend REST API.
///
/// Cheap to clone; clones share the token cache and interceptors.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("retry", &self.inner.retry)
            .field(
                "interceptors",
                &self
                    .inner
                    .interceptors
                    .iter()
                    .map(|i| i.name())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Starts building a client for `config`.
    pub fn builder(config: ApiClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            token_source: None,
            retry: RetryPolicy::default(),
            interceptors: Vec::new(),
        }
    }

    /// Client configuration.
    pub fn config(&self) -> &ApiClientConfig {
        &self.inner.config
    }

    /// Base URL every endpoint is relative to.
    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    /// The shared token cache.
    pub fn auth(&self) -> &AuthTokenCache {
        &self.inner.auth
    }

    /// Clears the cached token so the next request fetches a new one.
    pub async fn refresh_auth(&self) {
        info!("Clearing cached access token");
        self.inner.auth.clear().await;
    }

    /// Performs a GET request.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, RequestOptions::new())
            .await
    }

    /// Performs a POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::new().json(body)?;
        self.request(Method::POST, endpoint, options).await
    }

    /// Performs a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, RequestOptions::new())
            .await
    }

    /// Performs a request and deserializes the body into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = self.request_value(method, endpoint, options).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("unexpected response shape: {e}")))
    }

    /// Performs a request and returns the raw JSON body.
    #[instrument(skip(self, options), fields(method = %method, endpoint = %endpoint))]
    pub async fn request_value(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let url = self.inner.config.endpoint_url(endpoint);
        let mut auth_retries = 0;

        loop {
            let token = self.inner.auth.get_token().await?;
            debug!(attempt = auth_retries + 1, "Sending request");

            let mut request = self
                .inner
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .header(header::CONTENT_TYPE, "application/json")
                .headers(options.headers.clone());
            if !options.query.is_empty() {
                request = request.query(&options.query);
            }
            if let Some(ref body) = options.body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| self.transport_error(&e))?;
            let status = response.status();
            debug!(status = %status, "Response received");

            if status == StatusCode::UNAUTHORIZED {
                if self.inner.retry.allows_auth_retry(auth_retries) {
                    auth_retries += 1;
                    warn!("Request unauthorized, refreshing token and retrying");
                    self.inner.auth.clear().await;
                    continue;
                }
                warn!("Request still unauthorized after token refresh");
                return Err(ApiError::Authentication(
                    "the server rejected the access token".to_string(),
                ));
            }

            return self.finish(&method, endpoint, response).await;
        }
    }

    /// Unauthenticated GET with a deadline.
    ///
    /// Expiry of the deadline yields [`ApiError::Timeout`].
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn probe<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        deadline: Duration,
    ) -> Result<T, ApiError> {
        let url = self.inner.config.endpoint_url(endpoint);
        let send = self.inner.http.get(&url).send();

        let response = match tokio::time::timeout(deadline, send).await {
            Ok(result) => result.map_err(|e| self.transport_error(&e))?,
            Err(_) => {
                warn!(deadline_secs = deadline.as_secs(), "Probe timed out");
                return Err(ApiError::Timeout(deadline));
            }
        };

        let value = self.finish(&Method::GET, endpoint, response).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("unexpected response shape: {e}")))
    }

    /// Handles a non-401 response: error mapping, parsing, interceptors.
    async fn finish(
        &self,
        method: &Method,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            let err = ApiError::from_response_body(status, &text);
            warn!(status = %status, error = %err, "Request failed");
            return Err(err);
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {e}")))?
        };

        let intercepted = InterceptedResponse {
            method,
            endpoint,
            status,
            body: &body,
        };
        for interceptor in &self.inner.interceptors {
            debug!(interceptor = interceptor.name(), "Running response interceptor");
            interceptor.on_response(&intercepted).await;
        }

        Ok(body)
    }

    fn transport_error(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            return ApiError::Timeout(self.inner.config.timeout);
        }
        ApiError::Network {
            base_url: self.inner.config.base_url.clone(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ApiClientConfig,
    token_source: Option<Arc<dyn TokenSource>>,
    retry: RetryPolicy,
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    /// Uses a custom token source instead of the auth endpoint.
    pub fn token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registers a response interceptor. Interceptors run in registration order.
    pub fn interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        self.config.validate()?;

        let http = Client::builder()
            .timeout(self.config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {e}")))?;

        let source = self.token_source.unwrap_or_else(|| {
            Arc::new(HttpTokenSource::new(
                http.clone(),
                self.config.auth_url.clone(),
                self.config.session_cookie.clone(),
            ))
        });

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                auth: AuthTokenCache::new(source),
                retry: self.retry,
                interceptors: self.interceptors,
            }),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenSource;
    use async_trait::async_trait;
    use serde_json::json;
    use apiconsole_core::AuthToken;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::builder(ApiClientConfig::new(server.uri()))
            .token_source(Arc::new(StaticTokenSource::new("test-token")))
            .build()
            .unwrap()
    }

    /// Hands out `token-0`, `token-1`, ... and counts fetches.
    #[derive(Default)]
    struct SequenceSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl TokenSource for SequenceSource {
        async fn fetch_token(&self) -> Result<AuthToken, ApiError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(AuthToken::from_expires_in(format!("token-{n}"), 3600).unwrap())
        }
    }

    fn sequenced_client(server: &MockServer) -> (ApiClient, Arc<SequenceSource>) {
        let source = Arc::new(SequenceSource::default());
        let client = ApiClient::builder(ApiClientConfig::new(server.uri()))
            .token_source(source.clone())
            .build()
            .unwrap();
        (client, source)
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl ResponseInterceptor for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn on_response(&self, response: &InterceptedResponse<'_>) {
            self.seen
                .lock()
                .unwrap()
                .push((response.endpoint.to_string(), response.body.clone()));
        }
    }

    #[tokio::test]
    async fn test_sends_bearer_and_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokens/redeem"))
            .and(header_eq("authorization", "Bearer test-token"))
            .and(header_eq("content-type", "application/json"))
            .and(body_json(json!({"token": "abc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value: Value = client
            .post("/tokens/redeem", &json!({"token": "abc"}))
            .await
            .unwrap();
        assert_eq!(value["ok"], json!(true));
    }

    #[tokio::test]
    async fn test_caller_headers_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage/history"))
            .and(query_param("limit", "5"))
            .and(header_eq("x-request-source", "cli"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let options = RequestOptions::new()
            .query("limit", 5)
            .header(
                header::HeaderName::from_static("x-request-source"),
                HeaderValue::from_static("cli"),
            );
        let rows: Vec<Value> = client
            .request(Method::GET, "/usage/history", options)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_401_retried_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/credits/balance"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>("/credits/balance").await.unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_401_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/credits/balance"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/credits/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value: Value = client.get("/credits/balance").await.unwrap();
        assert_eq!(value["credits"], json!(3));
    }

    #[tokio::test]
    async fn test_401_refetches_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/credits/balance"))
            .and(header_eq("authorization", "Bearer token-0"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/credits/balance"))
            .and(header_eq("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits": 8})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, source) = sequenced_client(&server);
        let value: Value = client.get("/credits/balance").await.unwrap();

        assert_eq!(value["credits"], json!(8));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_401_fetches_twice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/credits/balance"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let (client, source) = sequenced_client(&server);
        let err = client.get::<Value>("/credits/balance").await.unwrap_err();

        assert!(matches!(err, ApiError::Authentication(_)));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::builder(ApiClientConfig::new(server.uri()))
            .token_source(Arc::new(StaticTokenSource::new("t")))
            .retry_policy(RetryPolicy::no_retry())
            .build()
            .unwrap();
        assert!(client.get::<Value>("/x").await.is_err());
    }

    #[tokio::test]
    async fn test_error_body_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "database down"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>("/tokens/all").await.unwrap_err();
        match err {
            ApiError::Http {
                status,
                ref message,
                ref details,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database down");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_interceptors_see_success_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"remainingCredits": 9})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fail"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"remainingCredits": 1})))
            .mount(&server)
            .await;

        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::builder(ApiClientConfig::new(server.uri()))
            .token_source(Arc::new(StaticTokenSource::new("t")))
            .interceptor(recorder.clone())
            .build()
            .unwrap();

        let _: Value = client.get("/ok").await.unwrap();
        assert!(client.get::<Value>("/fail").await.is_err());

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "/ok");
        assert_eq!(seen[0].1["remainingCredits"], json!(9));
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tokens/t-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value: Value = client.delete("/tokens/t-1").await.unwrap();
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_network_error_names_base_url() {
        // Nothing listens on port 9 (discard) on test hosts.
        let client = ApiClient::builder(ApiClientConfig::new("http://127.0.0.1:9"))
            .token_source(Arc::new(StaticTokenSource::new("t")))
            .build()
            .unwrap();

        let err = client.get::<Value>("/health").await.unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
        assert!(err.to_string().contains("http://127.0.0.1:9"));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "ok"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .probe::<Value>("/health", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_probe_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        // A token source that always fails proves no token is requested.
        struct NoToken;
        #[async_trait]
        impl TokenSource for NoToken {
            async fn fetch_token(&self) -> Result<apiconsole_core::AuthToken, ApiError> {
                Err(ApiError::Authentication("should not be called".to_string()))
            }
        }

        let client = ApiClient::builder(ApiClientConfig::new(server.uri()))
            .token_source(Arc::new(NoToken))
            .build()
            .unwrap();
        let value: Value = client
            .probe("/health", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(value["status"], json!("ok"));
    }

    #[tokio::test]
    async fn test_invalid_base_url_rejected() {
        let result = ApiClient::builder(ApiClientConfig::new("::nope::")).build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
