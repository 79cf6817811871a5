//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (ApiClient: verbs, JSON helpers)
//!     → request.rs (RequestDescriptor: request ID, retry marker)
//!     → session::coordinator (401 recovery)
//!     → transport.rs (one exchange over reqwest, cookies kept)
//!     → response.rs (buffered body, JSON decode)
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod transport;

pub use client::ApiClient;
pub use request::{RequestDescriptor, X_REQUEST_ID};
pub use response::ApiResponse;
pub use transport::{HttpTransport, Transport};
