//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce fetch deadline, cancel on expiry)
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - No retries: each inbound request makes exactly one upstream attempt

pub mod timeouts;

pub use timeouts::{with_timeout, Bounded};
