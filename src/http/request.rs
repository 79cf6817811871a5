//! Request descriptors.
//!
//! # Responsibilities
//! - Describe one call (method, path, headers, body) independently of the transport
//! - Carry a unique request ID, shared by the original attempt and its replay
//! - Carry the retry marker that keeps a request from being coordinated twice
//!
//! # Design Decisions
//! - Request ID assigned at construction, before the first attempt
//! - Body held as `Bytes` so a replay re-sends the same buffer without copying
//! - Only the session layer may set the retry marker

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Header carrying the request ID on every attempt.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Immutable description of a call plus its retry marker.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    id: Uuid,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    retried: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `path` (relative to the API base URL).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            id: Uuid::new_v4(),
            method,
            path,
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header to every attempt of this request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a raw body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON body and the matching content type.
    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> ClientResult<Self> {
        let encoded = serde_json::to_vec(value).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path without its query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Whether this request has already been replayed once.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
