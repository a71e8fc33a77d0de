//! HTTP server setup and request pipeline.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy handler
//! - Wire up middleware (tracing)
//! - Bind server to listener, one task per connection
//! - Classify each request and dispatch it to the right forwarding path
//! - Enforce the method policy on JSON-RPC requests
//! - Close the listener on shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{request::Parts, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::http::forward::Forwarder;
use crate::http::request::RequestId;
use crate::observability::metrics;
use crate::routing::{Classifier, Disposition};
use crate::security::MethodPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<MethodPolicy>,
    pub classifier: Arc<Classifier>,
    pub forwarder: Forwarder,
    pub max_body_bytes: usize,
}

/// HTTP server for the filtering proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and policy.
    pub fn new(config: &ProxyConfig, policy: MethodPolicy) -> ProxyResult<Self> {
        let forwarder = Forwarder::new(&config.upstream)?;

        tracing::info!(
            upstream = %forwarder.upstream().authority(),
            timeout_secs = ?config.upstream.timeout_secs,
            "Upstream configured"
        );

        let state = AppState {
            policy: Arc::new(policy),
            classifier: Arc::new(Classifier::new()),
            forwarder,
            max_body_bytes: config.limits.max_body_bytes,
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Shutdown closes the listener immediately. Connections already being
    /// served are not drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let serve = axum::serve(listener, app).into_future();

        tokio::select! {
            result = serve => result?,
            _ = shutdown.recv() => {
                tracing::info!("Shutting down server...");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Classifies the request, applies the policy and forwards it.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = RequestId::new();
    let (parts, body) = request.into_parts();

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        peer = %peer,
        "Proxying request"
    );

    let (label, result) = match state.classifier.download_kind(parts.uri.path()) {
        Some(kind) => {
            tracing::info!(
                request_id = %request_id,
                path = %parts.uri.path(),
                "Received file download request"
            );
            (
                Disposition::FileDownload(kind).as_str(),
                state.forwarder.forward_file(kind, &parts, &request_id).await,
            )
        }
        None => forward_buffered(&state, &parts, body, peer, &request_id).await,
    };

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            log_failure(&request_id, &e);
            e.into_response()
        }
    };

    metrics::record_request(label, response.status().as_u16(), start_time);
    response
}

/// Buffered path: read the body, classify it, check the policy, forward.
async fn forward_buffered(
    state: &AppState,
    parts: &Parts,
    body: Body,
    peer: SocketAddr,
    request_id: &RequestId,
) -> (&'static str, ProxyResult<Response>) {
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => return ("unread", Err(ProxyError::BodyRead(e))),
    };

    tracing::debug!(
        request_id = %request_id,
        body = %String::from_utf8_lossy(&body),
        "Received raw request body"
    );

    let disposition = state.classifier.classify_body(&body);

    if let Disposition::RpcCandidate { method } = &disposition {
        tracing::info!(
            request_id = %request_id,
            requester = %peer,
            method = %method,
            "JSON-RPC request"
        );

        if !state.policy.is_allowed(method) {
            return (
                disposition.as_str(),
                Err(ProxyError::Forbidden { method: method.clone() }),
            );
        }
    }

    let result = state
        .forwarder
        .forward(parts, body, request_id)
        .await
        .map(IntoResponse::into_response);

    (disposition.as_str(), result)
}

fn log_failure(request_id: &RequestId, error: &ProxyError) {
    match error {
        ProxyError::Forbidden { method } => {
            tracing::debug!(request_id = %request_id, method = %method, "Request rejected by policy");
        }
        ProxyError::UpstreamStatus { status, .. } => {
            tracing::debug!(request_id = %request_id, status = %status, "Relaying upstream error");
        }
        other => {
            tracing::error!(request_id = %request_id, error = %other, "Request failed");
        }
    }
}
