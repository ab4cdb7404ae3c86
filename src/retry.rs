//! Retry with exponential backoff for remote calls.
//!
//! Only failures classified as retryable are retried; everything else
//! surfaces immediately.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use rand::{thread_rng, Rng};
use tokio::time::sleep;
use tracing::warn;

use crate::config::RetryPolicyConfig;
use crate::error::RemoteError;

/// Backoff policy for transient remote failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub jitter_factor: f64,
}

impl From<&RetryPolicyConfig> for RetryPolicy {
    fn from(cfg: &RetryPolicyConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            base_delay_ms: cfg.base_delay_ms,
            jitter_factor: cfg.jitter_factor,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryPolicyConfig::default())
    }
}

impl RetryPolicy {
    /// Policy with zero delay, for tests that exercise exhaustion.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            jitter_factor: 0.0,
        }
    }

    fn backoff(&self, attempts_completed: u32) -> Duration {
        let exp = (self.base_delay_ms as f64) * 2_f64.powi(attempts_completed as i32);
        let jitter = if self.jitter_factor > 0.0 {
            thread_rng().gen_range(0.0..(self.jitter_factor * exp).max(f64::EPSILON))
        } else {
            0.0
        };
        Duration::from_millis((exp + jitter) as u64)
    }

    /// Runs `op`, retrying retryable failures up to `max_attempts` total
    /// attempts. Non-retryable failures return immediately.
    pub async fn run<T, F, Fut>(&self, label: &'static str, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    counter!("remote_retries_total", "operation" => label).increment(1);
                    warn!(
                        operation = label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying remote call"
                    );
                    sleep(delay).await;
                }
                Err(err) => {
                    if err.retryable() {
                        counter!("remote_retries_exhausted_total", "operation" => label)
                            .increment(1);
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn retryable_error() -> RemoteError {
        classify(Some(503), None, "Service Unavailable").into()
    }

    fn terminal_error() -> RemoteError {
        classify(Some(401), None, "Unauthorized").into()
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::immediate(3)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, RemoteError>(42) }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_retryable_until_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::immediate(3)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(retryable_error()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_terminal_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::immediate(3)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(terminal_error()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::immediate(3)
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(retryable_error())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 100,
            jitter_factor: 0.0,
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
    }
}
