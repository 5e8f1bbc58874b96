use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppResult;

/// Marker GitHub puts in the body of a throttled 403 response
pub const RATE_LIMIT_MARKER: &str = "API Rate Limit Exceeded";

/// Retry settings for [`RateLimitedCaller`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after a rate-limit response
    pub cooldown: Duration,
    /// Total attempts, including the first
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(65),
            max_attempts: 3,
        }
    }
}

/// Source of the cooldown pause
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Paces remote calls against the API rate limit
///
/// Every remote fetch goes through [`RateLimitedCaller::call`]. A rate-limited
/// failure triggers a fixed cooldown and a retry of the same operation; any
/// other failure, or the failure of the last allowed attempt, is returned to
/// the caller unchanged.
#[derive(Clone)]
pub struct RateLimitedCaller {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    attempts: Arc<AtomicU64>,
}

impl RateLimitedCaller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            policy,
            sleeper,
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Remote attempts issued so far, retries included
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Runs `operation`, retrying on rate-limit failures
    ///
    /// `operation` is invoked once per attempt and must rebuild the same
    /// request each time.
    pub async fn call<T, F, Fut>(&self, label: &str, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.attempts.fetch_add(1, Ordering::Relaxed);

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() && attempt < max_attempts => {
                    tracing::warn!(
                        call = %label,
                        attempt,
                        max_attempts,
                        cooldown_secs = self.policy.cooldown.as_secs(),
                        "Too many API calls, taking a break..."
                    );
                    self.sleeper.sleep(self.policy.cooldown).await;
                    tracing::info!(call = %label, "Phew! Back to work.");
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_rate_limited() {
                        tracing::error!(
                            call = %label,
                            attempts = attempt,
                            "Still rate limited after final attempt"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
