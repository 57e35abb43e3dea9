//! Retry with exponential backoff and jitter for idempotent store reads.
//!
//! Only `GET` requests go through [`retry_with_backoff`]. Order writes are
//! sent exactly once; a failed write is reported to the caller.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Returns `true` if `err` is a transient condition worth retrying.
///
/// Retriable:
/// - [`ApiError::Http`] for timeouts and connection failures.
/// - [`ApiError::RateLimited`]: HTTP 429.
/// - [`ApiError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, other 4xx, malformed bodies, bad configuration) is
/// returned immediately.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ApiError::RateLimited { .. } => true,
        ApiError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ApiError::NotFound { .. }
        | ApiError::Deserialize { .. }
        | ApiError::InvalidBaseUrl { .. } => false,
    }
}

/// Longest computed backoff. A server-requested `Retry-After` may exceed it.
const MAX_DELAY_MS: u64 = 30_000;

/// Sleep before retry number `attempt` (1-based).
///
/// `jitter` is a sample in `[0, 1)` mapped to a ±25 % spread around the
/// exponential delay. A 429 waits at least as long as its `Retry-After`.
fn backoff_delay_ms(err: &ApiError, attempt: u32, backoff_base_ms: u64, jitter: f64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (jitter * 0.5 + 0.75)) as u64;
    match err {
        ApiError::RateLimited { retry_after_secs } => {
            jittered.max(retry_after_secs.saturating_mul(1000))
        }
        _ => jittered,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// | Attempt | Sleep before next attempt      |
/// |---------|--------------------------------|
/// | 1       | base × 2⁰ ± 25 % jitter        |
/// | 2       | base × 2¹ ± 25 % jitter        |
/// | 3       | base × 2² ± 25 % jitter        |
///
/// Delay is capped at 30 s, except that a 429 honours the server's
/// `Retry-After` when that is longer.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let jitter = rand::random::<f64>();
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_ms, jitter);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient store API error; retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> ApiError {
        ApiError::UnexpectedStatus {
            status: 503,
            url: "/goods".to_owned(),
            body: String::new(),
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&server_error()));
        assert!(is_retriable(&ApiError::RateLimited {
            retry_after_secs: 1
        }));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&ApiError::UnexpectedStatus {
            status: 422,
            url: "/orders".to_owned(),
            body: String::new(),
        }));
        assert!(!is_retriable(&ApiError::NotFound {
            url: "/goods/9".to_owned()
        }));
    }

    #[test]
    fn backoff_doubles_per_attempt_and_caps() {
        let err = server_error();
        // jitter 0.5 maps to a factor of exactly 1.0
        assert_eq!(backoff_delay_ms(&err, 1, 500, 0.5), 500);
        assert_eq!(backoff_delay_ms(&err, 3, 500, 0.5), 2000);
        assert_eq!(backoff_delay_ms(&err, 10, 500, 0.5), MAX_DELAY_MS);
    }

    #[test]
    fn rate_limit_waits_at_least_retry_after() {
        let err = ApiError::RateLimited {
            retry_after_secs: 7,
        };
        assert_eq!(backoff_delay_ms(&err, 1, 500, 0.5), 7000);
        assert_eq!(backoff_delay_ms(&err, 1, 0, 0.0), 7000);

        let short = ApiError::RateLimited {
            retry_after_secs: 0,
        };
        assert_eq!(backoff_delay_ms(&short, 2, 500, 0.5), 1000);
    }

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, ApiError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ApiError>(server_error())
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ApiError::UnexpectedStatus { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ApiError>(ApiError::NotFound {
                    url: "/goods/1".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ApiError::NotFound { .. })));
    }
}
