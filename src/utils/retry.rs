use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry
// ============================================================================
//
// Retries an operation while its error is transient, doubling (by
// `multiplier`) the pause between attempts up to `max_delay`.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Pause after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for any single pause
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Pause to take after `attempt` (1-based) has failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

/// Outcome of a retried operation together with the attempts it took.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Still failing after `max_attempts`
    Exhausted { error: E, attempts: u32 },
    /// Failed with an error that retrying cannot fix
    Permanent { error: E, attempts: u32 },
}

/// Errors that say whether another attempt could succeed.
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

pub async fn retry_on_transient<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Operation succeeded after retry");
                }
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) if !error.is_transient() => {
                tracing::debug!(attempt, error = %error, "Permanent failure, not retrying");
                return RetryOutcome::Permanent {
                    error,
                    attempts: attempt,
                };
            }
            Err(error) if attempt >= max_attempts => {
                tracing::debug!(attempt, error = %error, "Giving up after final attempt");
                return RetryOutcome::Exhausted {
                    error,
                    attempts: attempt,
                };
            }
            Err(error) => {
                let delay = config.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "Transient failure, retrying after delay"
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    enum TestError {
        Flaky,
        Broken,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl IsTransient for TestError {
        fn is_transient(&self) -> bool {
            matches!(self, TestError::Flaky)
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            multiplier: 2.0,
        };

        assert_eq!(config.delay_after(1), Duration::from_millis(100));
        assert_eq!(config.delay_after(2), Duration::from_millis(200));
        assert_eq!(config.delay_after(3), Duration::from_millis(300));
        assert_eq!(config.delay_after(4), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let counter = Arc::new(AtomicU32::new(0));

        let outcome = retry_on_transient(&fast_config(3), |_attempt| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError::Flaky)
                } else {
                    Ok("sent")
                }
            }
        })
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                assert_eq!(value, "sent");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let outcome = retry_on_transient(&fast_config(5), |_attempt| async {
            Err::<(), _>(TestError::Broken)
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Permanent { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_exhausts_after_max_attempts() {
        let outcome = retry_on_transient(&fast_config(2), |_attempt| async {
            Err::<(), _>(TestError::Flaky)
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_once_means_single_attempt() {
        let outcome = retry_on_transient(&RetryConfig::once(), |_attempt| async {
            Err::<(), _>(TestError::Flaky)
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 1, .. }));
    }
}
