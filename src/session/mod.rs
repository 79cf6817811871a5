//! Session recovery subsystem.
//!
//! # Data Flow
//! ```text
//! Request fails with 401:
//!     → policy.rs (401? not yet replayed? not the refresh endpoint?)
//!     → coordinator.rs (drive the refresh, or join queue.rs behind it)
//!     → refresh settles
//!         success → every waiter, then the driver, replays once
//!         failure → every waiter and the driver fail; redirect.rs fires once
//! ```
//!
//! # Design Decisions
//! - At most one refresh exchange in flight per client
//! - Waiters resume strictly in arrival order
//! - A request is replayed at most once (retry marker)
//! - The refresh endpoint is excluded by path, never coordinated

pub mod coordinator;
pub mod policy;
pub mod queue;
pub mod redirect;

pub use coordinator::RefreshCoordinator;
pub use policy::RetryPolicy;
pub use queue::PendingQueue;
pub use redirect::{ChannelRedirect, LogRedirect, LoginRedirect};
