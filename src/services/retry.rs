//! Bounded retry with exponential backoff and a per-call timeout for
//! collaborator calls.
//!
//! Backoff doubles with each retry: 500ms -> 1s -> 2s -> 4s -> 5s (max).
//! Only transient [`CollaboratorError`]s are retried. Cancellation is
//! observed while a call is in flight and while backing off.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::domain::models::RetryConfig;
use crate::domain::ports::CollaboratorError;

/// Why a guarded call did not produce a value.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("cancelled")]
    Cancelled,

    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: CollaboratorError,
    },
}

/// Retry policy for external calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Timeout applied to each attempt
    pub call_timeout: Duration,

    /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom settings
    pub const fn new(
        max_retries: u32,
        call_timeout: Duration,
        initial_backoff_ms: u64,
        max_backoff_ms: u64,
    ) -> Self {
        Self {
            max_retries,
            call_timeout,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Build the policy described by `config`.
    pub const fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_secs(config.call_timeout_secs),
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Run `operation` until it succeeds, fails permanently, runs out of
    /// retries, or `cancel` fires.
    pub async fn execute<F, Fut, T>(
        &self,
        operation_name: &str,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
    {
        let mut attempt = 0;

        loop {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(CallError::Cancelled),
                outcome = timeout(self.call_timeout, operation()) => outcome,
            };
            let result = outcome
                .unwrap_or_else(|_| Err(CollaboratorError::Timeout(self.call_timeout.as_secs())));

            match result {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(
                            operation = operation_name,
                            "Operation succeeded after {} retries",
                            attempt
                        );
                    }
                    return Ok(value);
                }
                Err(err) if self.should_retry(&err, attempt) => {
                    let backoff = self.calculate_backoff(attempt);
                    tracing::warn!(
                        operation = operation_name,
                        "Attempt {} failed with transient error: {}. Retrying in {:?}",
                        attempt + 1,
                        err,
                        backoff
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(CallError::Cancelled),
                        () = sleep(backoff) => {}
                    }
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        operation = operation_name,
                        "Operation failed after {} attempt(s): {}",
                        attempt + 1,
                        err
                    );
                    return Err(CallError::Exhausted {
                        operation: operation_name.to_string(),
                        attempts: attempt + 1,
                        source: err,
                    });
                }
            }
        }
    }

    /// Exponential backoff: `min(initial_backoff * 2^attempt, max_backoff)`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    /// Whether a failed attempt should be retried.
    pub const fn should_retry(&self, error: &CollaboratorError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_secs(5), 100, 1000)
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), 500, 5000);

        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(500));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.calculate_backoff(3), Duration::from_millis(4000));
        assert_eq!(policy.calculate_backoff(4), Duration::from_millis(5000));
        assert_eq!(policy.calculate_backoff(40), Duration::from_millis(5000));
    }

    #[test]
    fn test_should_retry_only_transient_errors() {
        let policy = policy(1);
        assert!(policy.should_retry(&CollaboratorError::RateLimited, 0));
        assert!(!policy.should_retry(&CollaboratorError::RateLimited, 1));
        assert!(!policy.should_retry(
            &CollaboratorError::Rejected {
                status: 400,
                message: "bad".to_string()
            },
            0
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failure_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = policy(1)
            .execute("generate", &CancellationToken::new(), || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(CollaboratorError::Network("reset".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = policy(2)
            .execute("generate", &CancellationToken::new(), || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(CollaboratorError::Server {
                        status: 503,
                        message: "unavailable".to_string(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(CallError::Exhausted { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = policy(3)
            .execute("generate", &CancellationToken::new(), || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(CollaboratorError::NotConfigured("api key".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(CallError::Exhausted { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let result: Result<(), _> = RetryPolicy::new(0, Duration::from_secs(2), 100, 100)
            .execute("analyze", &CancellationToken::new(), || async {
                sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        match result {
            Err(CallError::Exhausted { source, .. }) => {
                assert!(matches!(source, CollaboratorError::Timeout(2)));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result: Result<(), _> = policy(0)
            .execute("generate", &cancel, || async {
                sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(CallError::Cancelled)));
    }
}
