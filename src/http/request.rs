//! Outbound request construction.
//!
//! # Responsibilities
//! - Generate a request ID for log correlation
//! - Resolve the upstream target from configuration
//! - Copy inbound headers into a fresh header map
//! - Build the outbound request for the buffered and download paths
//!
//! # Design Decisions
//! - Request ID lives in log fields only; forwarded headers stay byte-identical
//! - Headers are copied, never shared with the inbound request
//! - Framing headers are dropped whenever the outbound body is empty by rule

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use axum::http::request::Parts;
use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri};
use thiserror::Error;

use crate::error::{ProxyError, ProxyResult};
use crate::routing::DownloadKind;

/// Unique identifier attached to every log line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Reasons an upstream URL is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpstreamUrlError {
    #[error("malformed url: {0}")]
    Malformed(String),
    #[error("missing scheme")]
    MissingScheme,
    #[error("unsupported scheme '{0}', only http is supported")]
    UnsupportedScheme(String),
    #[error("missing host")]
    MissingHost,
    #[error("must not contain a path or query")]
    HasPath,
}

/// Scheme and authority of the upstream service.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamTarget {
    /// Parse an `http://host[:port]` base URL.
    pub fn parse(url: &str) -> Result<Self, UpstreamUrlError> {
        let uri: Uri = url
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| UpstreamUrlError::Malformed(e.to_string()))?;

        match uri.scheme() {
            Some(scheme) if *scheme == Scheme::HTTP => {}
            Some(scheme) => return Err(UpstreamUrlError::UnsupportedScheme(scheme.to_string())),
            None => return Err(UpstreamUrlError::MissingScheme),
        }

        let authority = uri.authority().cloned().ok_or(UpstreamUrlError::MissingHost)?;

        if !matches!(uri.path(), "" | "/") || uri.query().is_some() {
            return Err(UpstreamUrlError::HasPath);
        }

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
        })
    }

    /// Absolute upstream URI for the given path and query.
    pub fn uri(&self, path_and_query: &str) -> ProxyResult<Uri> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

/// Copy every inbound header, repeated values included, into a new map.
pub fn copy_headers(src: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(src.len());
    for (name, value) in src.iter() {
        headers.append(name.clone(), value.clone());
    }
    headers
}

fn strip_framing_headers(headers: &mut HeaderMap) {
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
}

fn assemble(method: Method, uri: Uri, headers: HeaderMap, body: Body) -> ProxyResult<Request<Body>> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;
    *req.headers_mut() = headers;
    Ok(req)
}

/// Build the outbound request for a JSON-RPC or opaque request.
///
/// POST carries the raw inbound body to the upstream root. GET carries the
/// raw inbound query string and no body. Every other method is rejected
/// before any upstream contact.
pub fn build_buffered_request(
    upstream: &UpstreamTarget,
    parts: &Parts,
    body: Bytes,
) -> ProxyResult<Request<Body>> {
    let mut headers = copy_headers(&parts.headers);

    match parts.method {
        Method::POST => {
            let uri = upstream.uri("/")?;
            assemble(Method::POST, uri, headers, Body::from(body))
        }
        Method::GET => {
            let path_and_query = match parts.uri.query() {
                Some(query) => format!("/?{}", query),
                None => "/".to_string(),
            };
            let uri = upstream.uri(&path_and_query)?;
            strip_framing_headers(&mut headers);
            assemble(Method::GET, uri, headers, Body::empty())
        }
        ref other => Err(ProxyError::UnsupportedMethod(other.clone())),
    }
}

/// Build the outbound request for a file download.
///
/// Snapshots need a POST handshake with an explicitly empty octet-stream
/// body; genesis is a plain GET. The inbound query string is not forwarded.
pub fn build_download_request(
    upstream: &UpstreamTarget,
    kind: DownloadKind,
    parts: &Parts,
) -> ProxyResult<Request<Body>> {
    let uri = upstream.uri(parts.uri.path())?;
    let mut headers = copy_headers(&parts.headers);
    strip_framing_headers(&mut headers);

    if kind == DownloadKind::Snapshot {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
    }

    assemble(kind.outbound_method(), uri, headers, Body::empty())
}
