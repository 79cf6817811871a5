//! Authenticated API client with single-flight session refresh.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod observability;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use health::SessionProber;
pub use http::{ApiClient, ApiResponse, HttpTransport, RequestDescriptor, Transport};
pub use session::{LoginRedirect, RefreshCoordinator};
