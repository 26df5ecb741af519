//! Exponential backoff for quota errors.

use std::future::Future;
use std::time::Duration;

use super::ProviderError;
use crate::config::GatewayConfig;

/// How often and how patiently to retry quota failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; always at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Retry `op` while it fails with a quota error, up to the policy's
/// attempt bound. Any other error is returned immediately.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(operation, attempt, "Call succeeded after quota backoff");
                }
                return Ok(value);
            }
            Err(err) if err.is_quota() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "Quota exceeded, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_quota_errors() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff("op", &fast_policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(ProviderError::Quota("429".to_string()))
                } else {
                    Ok("image")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("image"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff("op", &fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::Quota("429".to_string())) }
        })
        .await;

        assert!(result.unwrap_err().is_quota());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_quota_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff("op", &fast_policy(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ProviderError::Http {
                    status: 403,
                    body: "permission denied".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Http { status: 403, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
