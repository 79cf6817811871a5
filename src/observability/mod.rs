//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! session and health subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID appears on every event about a request
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
