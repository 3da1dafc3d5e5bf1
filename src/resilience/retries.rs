//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failure is worth another attempt
//! - Wait out the backoff between attempts
//! - Stop early when the caller cancels
//!
//! # Design Decisions
//! - Only transient failures are retried; statuses in the policy's
//!   non-retryable set never are, whatever their class
//! - The last concrete error is returned once retries run out
//! - Sleeping goes through `Sleeper` so tests can observe the schedule

use futures_util::future::BoxFuture;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::api::types::{WalletError, WalletResult};
use crate::lifecycle::CancelToken;
use crate::observability::metrics;
use crate::resilience::backoff::{apply_jitter, backoff_delay};

/// How a single remote call is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Growth factor applied per attempt.
    pub backoff_multiplier: f64,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Statuses that are surfaced immediately.
    pub non_retryable_status_codes: BTreeSet<u16>,
    /// Random extra delay as a fraction of the computed one.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(300),
            non_retryable_status_codes: BTreeSet::new(),
            jitter_ratio: 0.0,
        }
    }
}

impl RetryPolicy {
    /// Build step: 2 retries after 2s and 4s.
    pub fn build_default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Broadcast step: 2 retries after 4s and 8s, 400 never retried.
    pub fn broadcast_default() -> Self {
        Self {
            base_delay: Duration::from_secs(4),
            non_retryable_status_codes: BTreeSet::from([400]),
            ..Self::default()
        }
    }

    /// Plain lookups: retry once, immediately.
    pub fn passthrough_default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            ..Self::default()
        }
    }

    /// Single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether `err` should be followed by another attempt.
    pub fn should_retry(&self, err: &WalletError) -> bool {
        if let Some(status) = err.status() {
            if self.non_retryable_status_codes.contains(&status) {
                return false;
            }
        }
        err.is_retryable()
    }
}

/// Source of backoff sleeps.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

/// Sleeps on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// Runs an operation under a `RetryPolicy`.
#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Retrier {
    /// Create a retrier that sleeps on the Tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Create a retrier with a custom sleeper.
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, fails for good, runs out of retries, or
    /// `cancel` is tripped. `op` receives the 0-based attempt number.
    pub async fn run<T, F, Fut>(
        &self,
        call: &'static str,
        cancel: &CancelToken,
        mut op: F,
    ) -> WalletResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = WalletResult<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::info!(call, attempt, "Cancelled before attempt");
                return Err(WalletError::Cancelled);
            }

            metrics::record_attempt(call);
            let err = match op(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(call, attempts = attempt + 1, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !self.policy.should_retry(&err) {
                tracing::warn!(call, attempt, error = %err, "Non-retryable failure");
                return Err(err);
            }

            if attempt >= self.policy.max_retries {
                tracing::error!(call, attempts = attempt + 1, error = %err, "Retries exhausted");
                return Err(err);
            }

            let delay = apply_jitter(backoff_delay(&self.policy, attempt), self.policy.jitter_ratio);
            tracing::info!(
                call,
                attempt,
                delay_ms = delay.as_millis() as u64,
                status = ?err.status(),
                error = %err,
                "Retrying after failure"
            );
            metrics::record_retry(call);

            if cancel.is_cancelled() {
                tracing::info!(call, attempt, "Cancelled before backoff");
                return Err(WalletError::Cancelled);
            }

            tokio::select! {
                _ = self.sleeper.sleep(delay) => {}
                _ = cancel.cancelled() => {
                    tracing::info!(call, attempt, "Cancelled during backoff");
                    return Err(WalletError::Cancelled);
                }
            }

            attempt += 1;
        }
    }
}

impl std::fmt::Debug for Retrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient(status: u16) -> WalletError {
        WalletError::from_status(status, "upstream failure")
    }

    fn retrier(policy: RetryPolicy) -> (Retrier, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        (Retrier::with_sleeper(policy, sleeper.clone()), sleeper)
    }

    #[tokio::test]
    async fn test_succeeds_without_retry() {
        let (retrier, sleeper) = retrier(RetryPolicy::default());
        let calls = AtomicU32::new(0);
        let result = retrier
            .run("test", &CancelToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, WalletError>(7) }
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_retries_follow_backoff_schedule() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 3.0,
            ..RetryPolicy::default()
        };
        let (retrier, sleeper) = retrier(policy);
        let result = retrier
            .run("test", &CancelToken::new(), |attempt| async move {
                if attempt < 3 {
                    Err(transient(500))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result, Ok(3));
        assert_eq!(
            sleeper.recorded(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(900)
            ]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let (retrier, sleeper) = retrier(RetryPolicy::default());
        let calls = AtomicU32::new(0);
        let result: WalletResult<()> = retrier
            .run("test", &CancelToken::new(), |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err(WalletError::Transient {
                        status: Some(500 + attempt as u16),
                        message: format!("attempt {}", attempt),
                    })
                }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.recorded().len(), 2);
        assert_eq!(
            result,
            Err(WalletError::Transient {
                status: Some(502),
                message: "attempt 2".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_non_retryable_status_stops_immediately() {
        let mut policy = RetryPolicy::default();
        policy.non_retryable_status_codes.insert(503);
        let (retrier, sleeper) = retrier(policy);
        let calls = AtomicU32::new(0);
        let result: WalletResult<()> = retrier
            .run("test", &CancelToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient(503)) }
            })
            .await;
        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_protocol_errors_not_retried() {
        let (retrier, _) = retrier(RetryPolicy::default());
        let calls = AtomicU32::new(0);
        let result: WalletResult<()> = retrier
            .run("test", &CancelToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(WalletError::Protocol("bad payload".into())) }
            })
            .await;
        assert!(matches!(result, Err(WalletError::Protocol(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let (retrier, _) = retrier(RetryPolicy::no_retry());
        let calls = AtomicU32::new(0);
        let _: WalletResult<()> = retrier
            .run("test", &CancelToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient(500)) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_prevents_attempt() {
        let (retrier, _) = retrier(RetryPolicy::default());
        let cancel = CancelToken::new();
        cancel.cancel();
        let calls = AtomicU32::new(0);
        let result: WalletResult<()> = retrier
            .run("test", &cancel, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert_eq!(result, Err(WalletError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_failure_skips_retry() {
        let (retrier, sleeper) = retrier(RetryPolicy::default());
        let cancel = CancelToken::new();
        let calls = AtomicU32::new(0);
        let result: WalletResult<()> = retrier
            .run("test", &cancel, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                cancel.cancel();
                async { Err(transient(500)) }
            })
            .await;
        assert_eq!(result, Err(WalletError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_real_sleep() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(3600),
            ..RetryPolicy::default()
        };
        let retrier = Retrier::new(policy);
        let cancel = CancelToken::new();
        let trip = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trip.cancel();
        });

        let result: WalletResult<()> = retrier
            .run("test", &cancel, |_| async { Err(transient(502)) })
            .await;
        assert_eq!(result, Err(WalletError::Cancelled));
    }

    #[test]
    fn test_default_policies() {
        let broadcast = RetryPolicy::broadcast_default();
        assert_eq!(broadcast.max_retries, 2);
        assert!(broadcast.non_retryable_status_codes.contains(&400));
        assert!(!broadcast.should_retry(&transient(400)));
        assert!(broadcast.should_retry(&transient(500)));

        let passthrough = RetryPolicy::passthrough_default();
        assert_eq!(passthrough.max_retries, 1);
        assert_eq!(passthrough.base_delay, Duration::ZERO);
    }
}
