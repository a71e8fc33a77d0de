//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, body)
//!     → classifier.rs (download path? JSON-RPC body?)
//!     → matcher.rs (evaluate path conditions)
//!     → Return: Disposition
//! ```
//!
//! # Design Decisions
//! - Matchers built at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same path and body always give the same disposition

pub mod classifier;
pub mod matcher;

pub use classifier::{Classifier, Disposition, DownloadKind};
