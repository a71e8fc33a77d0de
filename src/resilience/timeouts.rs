//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with an optional deadline
//! - Cancel the call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::{ProxyError, ProxyResult};

/// Run `call`, failing with [`ProxyError::UpstreamTimeout`] if `limit` elapses first.
pub async fn with_timeout<F, T>(limit: Option<Duration>, call: F) -> ProxyResult<T>
where
    F: Future<Output = ProxyResult<T>>,
{
    match limit {
        None => call.await,
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(ProxyError::UpstreamTimeout(limit.as_secs())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_limit_waits_for_result() {
        let result = with_timeout(None, async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, ProxyError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_limit_is_timeout_error() {
        let result = with_timeout(Some(Duration::from_secs(2)), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, ProxyError>(())
        })
        .await;
        assert!(matches!(result, Err(ProxyError::UpstreamTimeout(2))));
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let result: ProxyResult<()> = with_timeout(Some(Duration::from_secs(1)), async {
            Err(ProxyError::UpstreamUnreachable("refused".into()))
        })
        .await;
        assert!(matches!(result, Err(ProxyError::UpstreamUnreachable(_))));
    }
}
