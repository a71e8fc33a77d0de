//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one task per connection)
//!     → [routing::Classifier decides the path]
//!     → jsonrpc.rs (method extraction for buffered requests)
//!     → [security::MethodPolicy admits or rejects]
//!     → forward.rs (single upstream call)
//!         → request.rs (outbound method, uri, copied headers)
//!         → response.rs (JSON relay or streamed attachment)
//!     → Send to client
//! ```

pub mod forward;
pub mod jsonrpc;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use request::RequestId;
pub use server::HttpServer;
