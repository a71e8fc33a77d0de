//! Client response construction.
//!
//! # Responsibilities
//! - Relay buffered upstream replies as JSON
//! - Relay downloads as attachments without buffering
//! - Log stream failures that happen after headers were sent
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - A broken stream cannot be recalled; it is logged and counted only

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;

use crate::error::{ProxyError, ProxyResult};
use crate::http::request::RequestId;
use crate::observability::metrics;

/// Fully buffered upstream reply.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl IntoResponse for BufferedResponse {
    /// Upstream headers are not relayed; the content type is always JSON.
    fn into_response(self) -> Response {
        (
            self.status,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            self.body,
        )
            .into_response()
    }
}

/// Wrap an upstream body so transport errors mid-copy are logged.
pub fn logged_stream(body: Body, path: String, request_id: RequestId) -> Body {
    let stream = body.into_data_stream().inspect_err(move |e| {
        tracing::error!(
            request_id = %request_id,
            path = %path,
            error = %e,
            "Error streaming response"
        );
        metrics::record_stream_error();
    });
    Body::from_stream(stream)
}

/// Build the client response for a successful download.
pub fn download_response(
    upstream_headers: &HeaderMap,
    status: StatusCode,
    path: &str,
    body: Body,
) -> ProxyResult<Response> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", path))
        .map_err(|_| ProxyError::InvalidRequest(format!("invalid download path {}", path)))?;

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for name in [CONTENT_TYPE, CONTENT_LENGTH] {
        if let Some(value) = upstream_headers.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers.insert(CONTENT_DISPOSITION, disposition);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffered_response_is_json() {
        let response = BufferedResponse {
            status: StatusCode::IM_A_TEAPOT,
            body: Bytes::from_static(br#"{"result":"ok"}"#),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"result":"ok"}"#);
    }

    #[tokio::test]
    async fn stream_errors_are_passed_through() {
        let chunks = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "upstream reset")),
        ]);
        let body = logged_stream(Body::from_stream(chunks), "/snapshot-1".into(), RequestId::new());

        assert!(axum::body::to_bytes(body, usize::MAX).await.is_err());
    }

    #[tokio::test]
    async fn download_response_sets_attachment_headers() {
        let mut upstream_headers = HeaderMap::new();
        upstream_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-bzip2"));
        upstream_headers.insert(CONTENT_LENGTH, HeaderValue::from_static("4"));
        upstream_headers.insert("x-upstream-only", HeaderValue::from_static("1"));

        let body = logged_stream(Body::from("abcd"), "/genesis.tar.bz2".into(), RequestId::new());
        let response = download_response(&upstream_headers, StatusCode::OK, "/genesis.tar.bz2", body).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/x-bzip2");
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "4");
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=/genesis.tar.bz2"
        );
        assert!(response.headers().get("x-upstream-only").is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"abcd");
    }
}
