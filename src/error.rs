//! Per-request and startup error types.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while handling a request or starting the proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Configuration could not be read, parsed or validated.
    #[error("Error loading config: {0}")]
    Config(#[from] ConfigError),

    /// Listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Inbound method has no outbound equivalent (only GET and POST do).
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(Method),

    /// Policy rejected the JSON-RPC method.
    #[error("Method not allowed")]
    Forbidden { method: String },

    /// Inbound body could not be read.
    #[error("Unable to read request body")]
    BodyRead(#[source] axum::Error),

    /// Outbound request could not be built.
    #[error("failed to create forward request: {0}")]
    InvalidRequest(String),

    /// Upstream could not be reached (connect, write or read of headers).
    #[error("Failed to forward request: {0}")]
    UpstreamUnreachable(String),

    /// Upstream call exceeded the configured bound.
    #[error("Upstream request timed out after {0} seconds")]
    UpstreamTimeout(u64),

    /// Upstream answered but its body could not be read.
    #[error("Failed to read proxy response")]
    UpstreamBody(String),

    /// Upstream answered a download with a non-200 status.
    #[error("Proxy error: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// Download request failed before any headers were relayed.
    #[error("Failed to download file")]
    Download(#[source] Box<ProxyError>),
}

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    /// Status code sent to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ProxyError::UpstreamUnreachable(_) | ProxyError::UpstreamBody(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamStatus { status, .. } => *status,
            ProxyError::Download(inner) => match inner.as_ref() {
                ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
            ProxyError::Config(_)
            | ProxyError::Bind { .. }
            | ProxyError::UnsupportedMethod(_)
            | ProxyError::BodyRead(_)
            | ProxyError::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
