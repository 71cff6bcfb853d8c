//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound relay request:
//!     → headers.rs (drop Host and hop-by-hop headers)
//!     → Forward to upstream
//! ```

pub mod headers;
