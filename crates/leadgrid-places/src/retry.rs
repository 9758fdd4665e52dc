//! Retry utilities for the places client.
//!
//! Two distinct policies live here:
//!
//! - [`retry_with_backoff`] — exponential back-off with jitter for transient
//!   transport errors (timeouts, connection resets, 5xx).
//! - [`poll_until_ready`] — fixed-delay bounded polling for responses that
//!   are valid but "not yet ready" (a continuation token that the upstream
//!   has issued but not activated).

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: network-level failures (timeout, connect) and HTTP 5xx.
/// Not retriable: API-level statuses and malformed bodies — retrying cannot
/// change them, and the API statuses must be surfaced to the caller.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::Api { .. } | PlacesError::Deserialize { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The sleep before the n-th retry is `backoff_base_ms * 2^(n-1)`, ±25%
/// jitter, capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient places error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Polls `operation` until `is_ready` accepts its output, sleeping `delay`
/// between attempts, for at most `max_attempts` attempts (minimum one).
///
/// The last output is returned either way — callers inspect readiness
/// themselves once the budget is exhausted. Errors from `operation`
/// propagate immediately.
pub(crate) async fn poll_until_ready<T, F, Fut, P>(
    max_attempts: u32,
    delay: Duration,
    is_ready: P,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
    P: Fn(&T) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let value = operation().await?;
        if is_ready(&value) || attempt >= max_attempts {
            return Ok(value);
        }
        tracing::debug!(attempt, max_attempts, "result not ready — polling again");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api_error() -> PlacesError {
        PlacesError::Api {
            status: "REQUEST_DENIED".to_owned(),
            message: Some("bad key".to_owned()),
        }
    }

    fn deserialize_error() -> PlacesError {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        PlacesError::Deserialize {
            context: "test".to_owned(),
            source,
        }
    }

    #[test]
    fn api_error_is_not_retriable() {
        assert!(!is_retriable(&api_error()));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        assert!(!is_retriable(&deserialize_error()));
    }

    #[tokio::test]
    async fn backoff_succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, PlacesError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backoff_does_not_retry_api_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api_error())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "API errors must not retry");
        assert!(matches!(result, Err(PlacesError::Api { .. })));
    }

    #[tokio::test]
    async fn backoff_retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    // Simulate a retriable connect error.
                    let err = reqwest::Client::new()
                        .get("http://0.0.0.0:1")
                        .send()
                        .await
                        .unwrap_err();
                    Err::<u32, _>(PlacesError::Http(err))
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn poll_returns_first_ready_value() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = poll_until_ready(
            5,
            Duration::ZERO,
            |v: &u32| *v >= 3,
            || {
                let c = Arc::clone(&c);
                async move { Ok::<u32, PlacesError>(c.fetch_add(1, Ordering::SeqCst) + 1) }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn poll_returns_last_value_when_budget_exhausted() {
        let result = poll_until_ready(
            2,
            Duration::ZERO,
            |_: &u32| false,
            || async { Ok::<u32, PlacesError>(7) },
        )
        .await;
        // Never ready, but the last observation comes back instead of an error.
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn poll_clamps_zero_attempts_to_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = poll_until_ready(0, Duration::ZERO, |_: &u32| true, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, PlacesError>(1)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
