//! Bounded retry with overload-aware backoff
//!
//! Every call to the generative-language API goes through [`RetryPolicy::run`].
//! Failures classified as transient overload (HTTP 503 / "overloaded") wait
//! twice as long as other failures before the next attempt, and exhaust into
//! a distinct [`ApiError::Overloaded`] so the caller knows resubmission may
//! help. Other failures exhaust into the original error unchanged.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ApiError;

/// Bounded-retry configuration, immutable per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of invocations allowed, including the first.
    pub max_attempts: u32,
    /// Base unit of the backoff schedule.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(3000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Drive `operation` to success or exhaustion.
    ///
    /// The delay before attempt `i` (i > 1) is `base_delay * (i - 1)` for
    /// ordinary failures and `base_delay * (i - 1) * 2` when the previous
    /// failure looked like transient overload. Success on any attempt
    /// returns immediately; no further invocations are made.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        for attempt in 1..=self.max_attempts {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("attempt {} succeeded", attempt);
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient_overload() => {
                    warn!(
                        "attempt {}/{} failed (overloaded): {}",
                        attempt, self.max_attempts, err
                    );
                    if attempt == self.max_attempts {
                        return Err(ApiError::Overloaded);
                    }
                    tokio::time::sleep(self.base_delay * attempt * 2).await;
                }
                Err(err) => {
                    warn!("attempt {}/{} failed: {}", attempt, self.max_attempts, err);
                    if attempt == self.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.base_delay * attempt).await;
                }
            }
        }

        // Only reachable with max_attempts == 0.
        Err(ApiError::RetriesExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn policy(max_attempts: u32, base_delay_ms: u64) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(base_delay_ms))
    }

    fn overload_error() -> ApiError {
        ApiError::Http {
            status: 503,
            body: "model overloaded".to_string(),
        }
    }

    fn other_error() -> ApiError {
        ApiError::Http {
            status: 400,
            body: "bad request".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_first_attempt_invokes_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = policy(5, 1000)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ApiError>(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_once_then_succeed() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result = policy(3, 1000)
            .run(|| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(other_error())
                    } else {
                        Ok("second")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // One standard wait of base_delay * 1.
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_exhaustion_reraises_original() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result: Result<(), _> = policy(3, 1000)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(other_error()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Waits of 1000ms then 2000ms between the three attempts.
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
        match result.unwrap_err() {
            ApiError::Http { status, .. } => assert_eq!(status, 400),
            other => panic!("expected original error, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_exhaustion_is_distinct_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result: Result<(), _> = policy(3, 1000)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(overload_error()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Doubled waits of 2000ms then 4000ms between the three attempts.
        assert_eq!(start.elapsed(), Duration::from_millis(6000));
        assert!(matches!(result.unwrap_err(), ApiError::Overloaded));
    }

    #[tokio::test]
    async fn test_zero_attempts_fails_without_invoking() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = policy(0, 1000)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result.unwrap_err(), ApiError::RetriesExhausted));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(3000));
    }
}
