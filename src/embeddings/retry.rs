//! Retry policy for transient provider failures.
//!
//! The policy is an explicit value passed into the embedding client, not
//! ambient behavior: `{max_attempts, initial_delay, multiplier, max_delay}`
//! with retryability decided by `StoreError::is_transient`.

use std::future::Future;
use std::time::Duration;

use crate::types::Result;

/// Exponential backoff policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first call.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Factor applied to the delay after each failed attempt.
    pub multiplier: f64,

    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, delays 1s then 2s, capped at 10s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given 1-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// Run `op` under the policy, sleeping between transient failures.
///
/// Non-transient errors fail immediately; after exhausting the attempt
/// budget the last error is surfaced.
pub async fn retry_with_policy<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient provider error, retrying"
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
    use crate::types::StoreError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        // Capped at max_delay.
        assert_eq!(policy.delay_for(10), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retried_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let start = tokio::time::Instant::now();
        let result = retry_with_policy(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StoreError::TransientError("503".into()))
                } else {
                    Ok(42u32)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Slept 1s then 2s between the three attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result: Result<u32> = retry_with_policy(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::TransientError("still down".into())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(StoreError::TransientError(msg)) => assert_eq!(msg, "still down"),
            other => panic!("expected transient error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result: Result<u32> = retry_with_policy(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::ProviderError("bad request".into())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(StoreError::ProviderError(_))));
    }
}
