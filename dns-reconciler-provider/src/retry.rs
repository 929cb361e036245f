//! Rate-limited call executor
//!
//! Wraps a single remote operation and re-runs it while the provider reports
//! that the request rate has been exceeded. Any other outcome is returned on
//! the spot.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Total attempts, including the first call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 23;
/// Fixed wait between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Attempt cap and fixed delay for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Wait between two attempts. No backoff, no jitter.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Run `op`, retrying only on [`ProviderError::RateLimited`](crate::ProviderError::RateLimited).
///
/// Makes at most `policy.max_attempts` calls and sleeps `policy.delay` between
/// two of them. When the cap is reached the last rate-limit error is returned.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, provider_name: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Err(e) if e.is_rate_limited() && attempt < policy.max_attempts => {
                log::warn!(
                    "[{provider_name}] rate limit exceeded. Waiting {}s to retry ({attempt}/{}).",
                    policy.delay.as_secs_f32(),
                    policy.max_attempts
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) if e.is_rate_limited() => {
                log::debug!("[{provider_name}] giving up after {attempt} rate-limited attempts");
                return Err(e);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::ProviderError;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    fn throttled() -> ProviderError {
        ProviderError::RateLimited {
            provider: "test".into(),
            retry_after: None,
            raw_message: Some("Rate has been exceeded".into()),
        }
    }

    #[test]
    fn default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 23);
        assert_eq!(p.delay, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn success_is_not_retried() {
        let calls = AtomicU32::new(0);
        let res = with_retry(&fast(23), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await;
        assert!(matches!(res, Ok(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_throttling() {
        let calls = AtomicU32::new(0);
        let res = with_retry(&fast(23), "test", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= 3 { Err(throttled()) } else { Ok(n) }
        })
        .await;
        assert!(matches!(res, Ok(4)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let res: Result<()> = with_retry(&fast(23), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(throttled())
        })
        .await;
        assert!(matches!(res, Err(ProviderError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 23);
    }

    #[tokio::test]
    async fn other_errors_are_returned_immediately() {
        let calls = AtomicU32::new(0);
        let res: Result<()> = with_retry(&fast(23), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::NetworkError {
                provider: "test".into(),
                detail: "connection reset".into(),
            })
        })
        .await;
        assert!(matches!(res, Err(ProviderError::NetworkError { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let res: Result<()> = with_retry(&fast(0), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(throttled())
        })
        .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waits_the_fixed_delay_between_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(20),
        };
        let started = std::time::Instant::now();
        let res: Result<()> = with_retry(&policy, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(throttled())
        })
        .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 两次等待，最后一次失败后不再等待
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
