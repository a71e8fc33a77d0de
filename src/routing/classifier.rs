//! Request classification.
//!
//! # Responsibilities
//! - Detect download-shaped paths (genesis archive, snapshots)
//! - Detect JSON-RPC bodies and extract the method name
//! - Fall back to opaque forwarding for everything else
//!
//! # Design Decisions
//! - Path checks run first and never look at the body
//! - Paths are percent-decoded before matching (`/snapshot%2D1` is a download)
//! - An unparsable body is not an error, it is just forwarded unchecked
//! - Immutable after construction (thread-safe without locks)

use axum::http::Method;
use percent_encoding::percent_decode_str;

use crate::http::jsonrpc::RpcEnvelope;
use crate::routing::matcher::{AnyMatcher, ExactPathMatcher, Matcher, PathPrefixMatcher};

/// Genesis archive path served by the upstream.
pub const GENESIS_PATH: &str = "/genesis.tar.bz2";
/// Prefix of full snapshot archives.
pub const SNAPSHOT_PREFIX: &str = "/snapshot-";
/// Prefix of incremental snapshot archives.
pub const INCREMENTAL_SNAPSHOT_PREFIX: &str = "/incremental-snapshot";

/// Kind of file download, which decides the outbound handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// Genesis archive, fetched with a plain GET.
    Genesis,
    /// Full or incremental snapshot, fetched with an empty-body POST.
    Snapshot,
}

impl DownloadKind {
    /// Method used for the outbound request.
    pub fn outbound_method(&self) -> Method {
        match self {
            DownloadKind::Genesis => Method::GET,
            DownloadKind::Snapshot => Method::POST,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadKind::Genesis => "genesis",
            DownloadKind::Snapshot => "snapshot",
        }
    }
}

/// Forwarding strategy chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Stream a file from the upstream.
    FileDownload(DownloadKind),
    /// JSON-RPC call; the method must pass the policy.
    RpcCandidate { method: String },
    /// Anything else, forwarded without a method check.
    OpaqueForward,
}

impl Disposition {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::FileDownload(_) => "download",
            Disposition::RpcCandidate { .. } => "rpc",
            Disposition::OpaqueForward => "opaque",
        }
    }
}

/// Classifies inbound requests into forwarding strategies.
#[derive(Debug)]
pub struct Classifier {
    genesis: ExactPathMatcher,
    snapshot: AnyMatcher,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            genesis: ExactPathMatcher::new(GENESIS_PATH),
            snapshot: AnyMatcher::new(vec![
                Box::new(PathPrefixMatcher::new(SNAPSHOT_PREFIX)),
                Box::new(PathPrefixMatcher::new(INCREMENTAL_SNAPSHOT_PREFIX)),
            ]),
        }
    }

    /// Path-only check, done before the body is read.
    ///
    /// `path` is the raw request path; it is decoded here.
    pub fn download_kind(&self, path: &str) -> Option<DownloadKind> {
        let path = percent_decode_str(path).decode_utf8_lossy();
        if self.genesis.matches(&path) {
            Some(DownloadKind::Genesis)
        } else if self.snapshot.matches(&path) {
            Some(DownloadKind::Snapshot)
        } else {
            None
        }
    }

    /// Classify a non-download request by its buffered body.
    pub fn classify_body(&self, body: &[u8]) -> Disposition {
        match RpcEnvelope::parse(body) {
            Some(envelope) => Disposition::RpcCandidate {
                method: envelope.method().to_string(),
            },
            None => Disposition::OpaqueForward,
        }
    }

    /// Full classification. Path rules take priority over the body.
    pub fn classify(&self, path: &str, body: &[u8]) -> Disposition {
        match self.download_kind(path) {
            Some(kind) => Disposition::FileDownload(kind),
            None => self.classify_body(body),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
