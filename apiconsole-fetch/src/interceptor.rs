//! Response interceptors.
//!
//! Interceptors observe every successful response body after it is parsed
//! and before it is handed back to the caller. They cannot alter or reject
//! the response.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// A parsed successful response, as seen by interceptors.
#[derive(Debug, Clone, Copy)]
pub struct InterceptedResponse<'a> {
    /// Request method.
    pub method: &'a Method,
    /// Endpoint path relative to the base URL.
    pub endpoint: &'a str,
    /// Response status.
    pub status: StatusCode,
    /// Parsed JSON body (`Null` for empty bodies).
    pub body: &'a Value,
}

/// Hook run on every successful response.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Observes a response.
    async fn on_response(&self, response: &InterceptedResponse<'_>);
}
