//! Session health subsystem.
//!
//! # Data Flow
//! ```text
//! check_session():
//!     probe in flight?        → await the shared outcome
//!     within cooldown?        → true, no network
//!     otherwise               → spawn probe
//!                               → GET probe path via the coordinator
//!                               → on failure, one more fresh attempt
//!                               → record completion time, clear in-flight
//! ```
//!
//! # Design Decisions
//! - The prober never touches retry markers or the pending queue
//! - Cooldown is a rate limiter, not a request timeout

pub mod prober;

pub use prober::{ProbeConfig, SessionProber};
