//! Upstream forwarding.
//!
//! Two paths share one pooled HTTP client:
//! - buffered: JSON-RPC and opaque requests, whole reply read then relayed
//! - streaming: file downloads, reply body piped through chunk by chunk
//!
//! Each request is sent exactly once. Transport failures are reported to the
//! caller and never retried.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::Response;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::http::request::{self, RequestId, UpstreamTarget};
use crate::http::response::{self, BufferedResponse};
use crate::resilience::with_timeout;
use crate::routing::DownloadKind;

/// Sends requests to the upstream service.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream: UpstreamTarget,
    timeout: Option<Duration>,
}

impl Forwarder {
    /// Create a forwarder for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> ProxyResult<Self> {
        let upstream = UpstreamTarget::parse(&config.url)
            .map_err(|e| ProxyError::InvalidRequest(format!("upstream url '{}': {}", config.url, e)))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            upstream,
            timeout: config.timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn upstream(&self) -> &UpstreamTarget {
        &self.upstream
    }

    /// Forward a buffered request and buffer the whole reply.
    pub async fn forward(
        &self,
        parts: &Parts,
        body: Bytes,
        request_id: &RequestId,
    ) -> ProxyResult<BufferedResponse> {
        let req = request::build_buffered_request(&self.upstream, parts, body)?;

        tracing::debug!(
            request_id = %request_id,
            method = %req.method(),
            uri = %req.uri(),
            "Forwarding request upstream"
        );

        let exchange = async {
            let response = self
                .client
                .request(req)
                .await
                .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))?;

            let (head, body) = response.into_parts();
            let body = collect(body)
                .await
                .map_err(|e| ProxyError::UpstreamBody(e.to_string()))?;

            Ok::<_, ProxyError>(BufferedResponse {
                status: head.status,
                body,
            })
        };

        let reply = with_timeout(self.timeout, exchange).await?;

        tracing::debug!(
            request_id = %request_id,
            status = %reply.status,
            body = %String::from_utf8_lossy(&reply.body),
            "Received raw response body"
        );

        Ok(reply)
    }

    /// Forward a download and stream the reply back.
    ///
    /// Non-200 replies are read in full and turned into
    /// [`ProxyError::UpstreamStatus`]. The optional timeout only covers the
    /// wait for response headers, never the body stream.
    pub async fn forward_file(
        &self,
        kind: DownloadKind,
        parts: &Parts,
        request_id: &RequestId,
    ) -> ProxyResult<Response> {
        let path = parts.uri.path().to_string();
        let req = request::build_download_request(&self.upstream, kind, parts)?;

        tracing::info!(
            request_id = %request_id,
            path = %path,
            method = %req.method(),
            kind = kind.as_str(),
            "Forwarding file download"
        );

        let call = async {
            self.client
                .request(req)
                .await
                .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))
        };
        let upstream_response = with_timeout(self.timeout, call)
            .await
            .map_err(|e| ProxyError::Download(Box::new(e)))?;

        let (head, body) = upstream_response.into_parts();

        if head.status != StatusCode::OK {
            let text = match collect(body).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "Failed to read upstream error body");
                    String::new()
                }
            };
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                status = %head.status,
                body = %text,
                "Proxy responded with error"
            );
            return Err(ProxyError::UpstreamStatus {
                status: head.status,
                body: text,
            });
        }

        let body = response::logged_stream(Body::new(body), path.clone(), request_id.clone());
        response::download_response(&head.headers, head.status, &path, body)
    }
}

/// Read an upstream body to the end.
async fn collect(body: Incoming) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(Body::new(body), usize::MAX).await
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("upstream", &self.upstream)
            .field("timeout", &self.timeout)
            .finish()
    }
}
