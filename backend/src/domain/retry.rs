//! Jittered exponential backoff for remote deprovisioning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Retry tuning for gateway deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for the un-jittered delay.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Async sleeping abstraction so tests can observe delays without waiting.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Jitter strategy applied to the exponential base delay.
pub trait BackoffJitter: Send + Sync {
    /// Return the delay actually slept before `attempt`.
    fn jittered_delay(&self, base: Duration, attempt: u32) -> Duration;
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds up to a quarter of the base delay at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = (base_ms / 4).max(1);
        let extra = rand::thread_rng().gen_range(0..=max_extra);
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

/// Retry configuration bundled with its sleeper and jitter.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    sleeper: Arc<dyn RetrySleeper>,
    jitter: Arc<dyn BackoffJitter>,
}

impl RetryPolicy {
    /// Build a policy that really sleeps.
    pub fn new(config: RetryConfig) -> Self {
        Self::with_runtime(config, Arc::new(TokioSleeper), Arc::new(RandomJitter))
    }

    /// Build a policy with injected sleeping and jitter.
    pub fn with_runtime(
        config: RetryConfig,
        sleeper: Arc<dyn RetrySleeper>,
        jitter: Arc<dyn BackoffJitter>,
    ) -> Self {
        Self {
            config: RetryConfig {
                max_attempts: config.max_attempts.max(1),
                ..config
            },
            sleeper,
            jitter,
        }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Exponential delay preceding retry number `attempt` (1-based), capped.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use subdomain_registry::domain::{RetryConfig, RetryPolicy};
    ///
    /// let policy = RetryPolicy::new(RetryConfig {
    ///     max_attempts: 5,
    ///     initial_backoff: Duration::from_millis(200),
    ///     max_backoff: Duration::from_millis(500),
    /// });
    /// assert_eq!(policy.base_delay(1), Duration::from_millis(200));
    /// assert_eq!(policy.base_delay(2), Duration::from_millis(400));
    /// assert_eq!(policy.base_delay(3), Duration::from_millis(500));
    /// ```
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }

    /// Sleep before retry number `attempt`.
    pub async fn pause(&self, attempt: u32) {
        let delay = self.jitter.jittered_delay(self.base_delay(attempt), attempt);
        self.sleeper.sleep(delay).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
