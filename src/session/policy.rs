//! Refresh-and-retry eligibility.
//!
//! A failed request is coordinated only when the server answered 401, the
//! request has not been replayed yet, and the request is not the refresh
//! exchange itself.

use crate::error::ClientError;
use crate::http::request::RequestDescriptor;

/// Decides whether a failure enters the refresh path.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    refresh_path: String,
}

impl RetryPolicy {
    pub fn new(refresh_path: impl Into<String>) -> Self {
        let refresh_path: String = refresh_path.into();
        Self {
            refresh_path: normalise(&refresh_path).to_string(),
        }
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    /// True if `request` targets the refresh endpoint.
    pub fn is_refresh_exchange(&self, request: &RequestDescriptor) -> bool {
        normalise(request.route()) == self.refresh_path
    }

    /// True if `error` on `request` should trigger refresh and replay.
    pub fn should_coordinate(&self, request: &RequestDescriptor, error: &ClientError) -> bool {
        error.is_unauthorized() && !request.is_retried() && !self.is_refresh_exchange(request)
    }
}

fn normalise(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
