//! Client error taxonomy.
//!
//! Only `Unauthorized` is ever inspected by the session layer. Every other
//! variant travels back to the caller exactly as the transport produced it.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Result alias used across the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the authenticated client.
///
/// Cloneable so a single refresh failure can be handed to every request
/// suspended behind it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{method} {path} rejected: 401 Unauthorized")]
    Unauthorized { method: Method, path: String },

    #[error("{method} {path} failed with status {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("network error: {0}")]
    Network(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error("session refresh failed: {0}")]
    RefreshFailed(#[source] Box<ClientError>),

    #[error("session refresh abandoned before it settled")]
    RefreshAbandoned,

    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Wrap a transport-level failure.
    pub fn network<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Network(Arc::new(err))
    }

    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }
}
