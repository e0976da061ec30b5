//! Retry policy for oracle calls.
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{OracleResult, Result, RuntimeError};

/// Bounded retries with linear backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait before attempt `n` is `backoff * (n - 1)`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting.
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or
    /// the attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OracleResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < max_attempts && error.is_retryable() => {
                    warn!(operation, attempt, %error, "oracle call failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(RuntimeError::Oracle {
                        operation,
                        attempts: attempt,
                        source: error,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let value = policy
            .run("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(OracleError::Timeout)
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let result: Result<()> = policy
            .run("generate_enemy", || async { Err(OracleError::Unavailable("down".into())) })
            .await;
        match result {
            Err(RuntimeError::Oracle {
                operation, attempts, ..
            }) => {
                assert_eq!(operation, "generate_enemy");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refusals_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let result: Result<()> = policy
            .run("generate_cutscene", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(OracleError::Refused("content policy".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
