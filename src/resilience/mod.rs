//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (optional deadline on the single outbound call)
//!     → On failure: error relayed to the client, never retried
//! ```
//!
//! # Design Decisions
//! - Forward once, fail fast: no retries, no circuit breaking
//! - The deadline is opt-in; without it a call waits as long as the upstream does

pub mod timeouts;

pub use timeouts::with_timeout;
