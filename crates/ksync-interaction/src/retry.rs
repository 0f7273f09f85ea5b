//! Bounded retry with linear backoff, then fallback.

use crate::agent::AgentError;
use crate::reply::GatewayReply;
use ksync_core::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Longest server-requested wait; anything above it ends the retries.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_retry_after: Duration::from_millis(config.max_retry_after_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without waiting. A nonzero `Retry-After` ends them.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_retry_after: Duration::ZERO,
        }
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Wait before the next attempt, or `None` when the server asks for
    /// longer than `max_retry_after`.
    fn next_delay(&self, attempt: u32, err: &AgentError) -> Option<Duration> {
        match err.retry_after() {
            Some(wait) if wait > self.max_retry_after => None,
            Some(wait) => Some(self.delay_for(attempt).max(wait)),
            None => Some(self.delay_for(attempt)),
        }
    }
}

/// Runs `op` until it succeeds, fails permanently or runs out of attempts.
///
/// `op` receives the 1-based attempt number. Retryable failures wait
/// `base_delay * attempt`, or the server's `Retry-After` if that is longer.
/// When the last attempt fails, a failure is not retryable, or `Retry-After`
/// exceeds `max_retry_after`, `fallback` builds the value from the final
/// error and the reply is marked degraded.
pub async fn attempt_with_fallback<T, Op, Fut, Fb>(
    policy: &RetryPolicy,
    label: &str,
    mut op: Op,
    fallback: Fb,
) -> GatewayReply<T>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AgentError>>,
    Fb: FnOnce(&AgentError) -> T,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = label, attempt, "Succeeded after retry");
                }
                return GatewayReply::model(value);
            }
            Err(err) => err,
        };

        let delay = if err.is_retryable() && attempt < max_attempts {
            policy.next_delay(attempt, &err)
        } else {
            None
        };
        let Some(delay) = delay else {
            tracing::warn!(
                operation = label,
                attempt,
                retryable = err.is_retryable(),
                retry_after_ms = err.retry_after().map(|d| d.as_millis() as u64),
                error = %err,
                "Giving up, using fallback"
            );
            let reason = err.to_string();
            return GatewayReply::fallback(fallback(&err), reason);
        };

        tracing::warn!(
            operation = label,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Attempt failed, retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyOrigin;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> AgentError {
        AgentError::ProcessError {
            status_code: Some(503),
            message: "unavailable".into(),
            is_retryable: true,
            retry_after: None,
        }
    }

    fn rate_limited(retry_after: Duration) -> AgentError {
        AgentError::ProcessError {
            status_code: Some(429),
            message: "slow down".into(),
            is_retryable: true,
            retry_after: Some(retry_after),
        }
    }

    fn paced() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.max_retry_after, Duration::from_secs(30));
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_retry_after_falls_back_without_waiting() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let reply = attempt_with_fallback(
            &paced(),
            "test",
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<&str, _>(rate_limited(Duration::from_secs(86_400))) }
            },
            |_| "fallback",
        )
        .await;

        assert_eq!(reply.value, "fallback");
        assert!(reply.is_degraded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_retry_after_is_honored() {
        let started = tokio::time::Instant::now();
        let reply = attempt_with_fallback(
            &paced(),
            "test",
            |attempt| async move {
                if attempt == 1 {
                    Err(rate_limited(Duration::from_secs(5)))
                } else {
                    Ok("ok")
                }
            },
            |_| "fallback",
        )
        .await;

        assert_eq!(reply, GatewayReply::model("ok"));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(5));
        assert!(waited < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let reply = attempt_with_fallback(
            &RetryPolicy::immediate(3),
            "test",
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 { Err(transient()) } else { Ok("ok") }
                }
            },
            |_| "fallback",
        )
        .await;

        assert_eq!(reply, GatewayReply::model("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_fall_back() {
        let calls = AtomicU32::new(0);
        let reply = attempt_with_fallback(
            &RetryPolicy::immediate(2),
            "test",
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<&str, _>(transient()) }
            },
            |_| "fallback",
        )
        .await;

        assert_eq!(reply.value, "fallback");
        assert!(matches!(reply.origin, ReplyOrigin::Fallback { ref reason } if reason.contains("unavailable")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_authentication_is_not_retried() {
        let calls = AtomicU32::new(0);
        let reply = attempt_with_fallback(
            &RetryPolicy::immediate(5),
            "test",
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<&str, _>(AgentError::Authentication("bad key".into())) }
            },
            |_| "fallback",
        )
        .await;

        assert!(reply.is_degraded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let reply = attempt_with_fallback(
            &RetryPolicy::immediate(0),
            "test",
            |_| async { Ok::<_, AgentError>(1) },
            |_| 0,
        )
        .await;
        assert_eq!(reply.value, 1);
    }
}
