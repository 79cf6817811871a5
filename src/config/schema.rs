//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the authenticated client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote API location.
    pub api: ApiConfig,

    /// Session refresh and health probe settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is appended to (e.g., "https://api.example.com/api").
    pub base_url: String,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            user_agent: concat!("session-coordinator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Session handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the refresh exchange. Never coordinated itself.
    pub refresh_path: String,

    /// Lightweight authenticated endpoint used by the health probe.
    pub probe_path: String,

    /// Login surface the user agent is sent to when refresh fails.
    pub login_url: String,

    /// Minimum seconds between two network probes.
    pub probe_cooldown_secs: u64,

    /// Probe-level attempts before the session is declared unusable.
    pub probe_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_path: "/auth/refresh".to_string(),
            probe_path: "/auth/test".to_string(),
            login_url: "/login".to_string(),
            probe_cooldown_secs: 10,
            probe_attempts: 2,
        }
    }
}

impl SessionConfig {
    pub fn probe_cooldown(&self) -> Duration {
        Duration::from_secs(self.probe_cooldown_secs)
    }
}

/// Timeout configuration for outgoing requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
