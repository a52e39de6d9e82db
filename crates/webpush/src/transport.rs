//! HTTP delivery to the push service.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::trace;

use crate::error::TransportError;

/// A fully assembled push request.
#[derive(Debug, Clone)]
pub struct PushRequest {
    pub endpoint: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// What the push service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResponse {
    pub status: u16,
    pub body: String,
}

impl PushResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// User-replaceable network layer.
///
/// Implementations POST the request and report the status and body. They do
/// not interpret the status or retry.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn post(&self, request: PushRequest) -> Result<PushResponse, TransportError>;
}

/// Default transport over an async `reqwest::Client`.
///
/// Reuse one instance across sends for connection pooling. Timeouts are
/// configured on the wrapped client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushTransport for ReqwestTransport {
    async fn post(&self, request: PushRequest) -> Result<PushResponse, TransportError> {
        trace!(endpoint = %request.endpoint, bytes = request.body.len(), "POST push message");
        let response = self
            .client
            .post(&request.endpoint)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::with_source("sending request", e))?;

        let status = response.status().as_u16();
        // The body is informational only; an unreadable body is reported empty.
        let body = response.text().await.unwrap_or_default();
        Ok(PushResponse { status, body })
    }
}
