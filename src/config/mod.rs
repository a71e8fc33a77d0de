//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.json
//!     → loader.rs (read & deserialize)
//!     → [command-line overrides]
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → MethodPolicy / Forwarder built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; there is no reload
//! - The method lists are required, every other section has defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig,
};
pub use validation::ValidationError;
