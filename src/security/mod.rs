//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! JSON-RPC request (method extracted by the classifier):
//!     → policy.rs (blacklist, then whitelist, else deny)
//!     → Allowed: pass to forwarder
//!     → Rejected: 403, upstream never contacted
//! ```
//!
//! # Design Decisions
//! - Fail closed: unknown methods are rejected
//! - Only JSON-RPC bodies are checked; downloads and opaque bodies pass through

pub mod policy;

pub use policy::{MethodPolicy, PolicyDecision};
