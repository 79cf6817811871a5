//! Transport abstraction and the reqwest-backed implementation.
//!
//! # Responsibilities
//! - Perform exactly one request/response exchange per `send`
//! - Map the outcome onto `ClientError` (401, other status, network)
//! - Keep session cookies between exchanges
//!
//! # Design Decisions
//! - No retries here; replay policy lives in the session layer
//! - Non-2xx bodies are read into the error so callers keep the server message
//! - Timeouts are per attempt, enforced by the reqwest client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};

use crate::config::{ApiConfig, TimeoutConfig};
use crate::error::{ClientError, ClientResult};
use crate::http::request::{RequestDescriptor, X_REQUEST_ID};
use crate::http::response::ApiResponse;

/// One HTTP exchange with the remote API.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &RequestDescriptor) -> ClientResult<ApiResponse>;
}

/// Transport over a cookie-keeping reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for the configured API.
    pub fn new(api: &ApiConfig, timeouts: &TimeoutConfig) -> ClientResult<Self> {
        let user_agent = HeaderValue::from_str(&api.user_agent)
            .map_err(|e| ClientError::Config(format!("invalid user agent: {}", e)))?;
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self::with_client(client, &api.base_url))
    }

    /// Wrap an existing client. The client should keep cookies.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &RequestDescriptor) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> ClientResult<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method().clone(), self.url_for(request))
            .headers(request.headers().clone())
            .header(X_REQUEST_ID, request.id().to_string());
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(ClientError::network)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ClientError::network)?;

        tracing::trace!(
            request_id = %request.id(),
            method = %request.method(),
            path = %request.path(),
            status = status.as_u16(),
            retried = request.is_retried(),
            "Exchange completed"
        );

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized {
                method: request.method().clone(),
                path: request.path().to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                method: request.method().clone(),
                path: request.path().to_string(),
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
