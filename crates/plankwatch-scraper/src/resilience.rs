//! Retry, backoff, circuit breaking, and delay jitter for navigation.
//!
//! Blocked navigations (403/429 or a recognizable block page) back off on a
//! slow exponential schedule; other navigation errors on a short linear one.
//! Every failure feeds the adapter-local consecutive-failure counter; a run
//! of failures trips a long cooldown pause rather than an abort.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScrapeError;

/// Backoff schedule constants, replaceable so tests never sleep for real.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Base for the blocked schedule: `block_base * 2^(attempt-1)`.
    pub block_base_secs: u64,
    /// Cap on the blocked schedule.
    pub block_cap_secs: u64,
    /// Step for the generic-error schedule: `error_step * attempt`.
    pub error_step_secs: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            block_base_secs: 30,
            block_cap_secs: 300,
            error_step_secs: 15,
        }
    }
}

impl BackoffPolicy {
    /// Zero-delay policy for deterministic tests.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            block_base_secs: 0,
            block_cap_secs: 0,
            error_step_secs: 0,
        }
    }

    /// Delay before retrying a blocked navigation: `min(base * 2^(attempt-1), cap)`.
    #[must_use]
    pub fn block_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(62);
        let secs = self
            .block_base_secs
            .saturating_mul(1u64 << exp)
            .min(self.block_cap_secs);
        Duration::from_secs(secs)
    }

    /// Delay before retrying a generic navigation error: `step * attempt`.
    #[must_use]
    pub fn error_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.error_step_secs.saturating_mul(u64::from(attempt)))
    }
}

/// Per-adapter consecutive-failure counter with a cooldown trip wire.
///
/// Owned exclusively by one adapter instance; never shared. Reset to zero on
/// any successful navigation, incremented on block/error, and when the count
/// reaches the threshold [`CircuitBreaker::cooldown_due`] hands back one
/// cooldown period and resets.
#[derive(Debug)]
pub struct CircuitBreaker {
    consecutive_failures: u32,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            consecutive_failures: 0,
            threshold,
            cooldown,
        }
    }

    /// Records a blocked or failed navigation; returns the new count.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    /// Any successful navigation clears the streak.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Called before each page fetch. When the streak has reached the
    /// threshold, returns the cooldown to sleep and resets the counter so the
    /// run continues afterwards.
    pub fn cooldown_due(&mut self) -> Option<Duration> {
        if self.consecutive_failures >= self.threshold {
            self.consecutive_failures = 0;
            Some(self.cooldown)
        } else {
            None
        }
    }
}

/// Executes `operation` up to `max_attempts` times, backing off between
/// attempts per `policy` and feeding the breaker on every outcome.
///
/// # Errors
///
/// Returns the final error once attempts are exhausted. The breaker's counter
/// keeps the accumulated failures either way; only a later success clears it.
pub async fn with_navigation_retry<T, F, Fut>(
    breaker: &mut CircuitBreaker,
    policy: BackoffPolicy,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => {
                breaker.record_success();
                return Ok(value);
            }
            Err(err) => {
                let failures = breaker.record_failure();
                if attempt >= max_attempts {
                    return Err(err);
                }
                let delay = if err.is_blocked() {
                    policy.block_delay(attempt)
                } else {
                    policy.error_delay(attempt)
                };
                tracing::warn!(
                    attempt,
                    max_attempts,
                    consecutive_failures = failures,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "navigation failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Inter-request delay bounds, pre-scaled for the run context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayBounds {
    /// Scales base bounds for the run context: delays double outside CI, and
    /// sustained blocking inflates both bounds by `failure_step_ms` per
    /// consecutive failure.
    #[must_use]
    pub fn scaled(
        base_min_ms: u64,
        base_max_ms: u64,
        in_ci: bool,
        consecutive_failures: u32,
        failure_step_ms: u64,
    ) -> Self {
        let factor = if in_ci { 1 } else { 2 };
        let inflation = failure_step_ms.saturating_mul(u64::from(consecutive_failures));
        Self {
            min_ms: base_min_ms.saturating_mul(factor).saturating_add(inflation),
            max_ms: base_max_ms.saturating_mul(factor).saturating_add(inflation),
        }
    }
}

/// Sleeps a uniformly jittered duration within `bounds`.
pub async fn jittered_sleep(bounds: DelayBounds) {
    let ms = if bounds.max_ms > bounds.min_ms {
        rand::rng().random_range(bounds.min_ms..=bounds.max_ms)
    } else {
        bounds.min_ms
    };
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked() -> ScrapeError {
        ScrapeError::Blocked {
            url: "https://www.example.com".to_owned(),
            status: Some(403),
            title: None,
        }
    }

    fn nav_error() -> ScrapeError {
        ScrapeError::Navigation {
            url: "https://www.example.com".to_owned(),
            reason: "timeout".to_owned(),
        }
    }

    #[test]
    fn block_backoff_doubles_and_caps() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.block_delay(1), Duration::from_secs(30));
        assert_eq!(policy.block_delay(2), Duration::from_secs(60));
        assert_eq!(policy.block_delay(3), Duration::from_secs(120));
        assert_eq!(policy.block_delay(4), Duration::from_secs(240));
        assert_eq!(policy.block_delay(5), Duration::from_secs(300));
        assert_eq!(policy.block_delay(10), Duration::from_secs(300));
    }

    #[test]
    fn error_backoff_is_linear() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.error_delay(1), Duration::from_secs(15));
        assert_eq!(policy.error_delay(2), Duration::from_secs(30));
        assert_eq!(policy.error_delay(3), Duration::from_secs(45));
    }

    #[test]
    fn breaker_trips_once_at_threshold_and_resets() {
        let mut breaker = CircuitBreaker::new(5, Duration::from_secs(300));

        for _ in 0..4 {
            breaker.record_failure();
            assert!(breaker.cooldown_due().is_none());
        }
        breaker.record_failure();

        // Exactly one cooldown, then the counter is back at zero.
        assert_eq!(breaker.cooldown_due(), Some(Duration::from_secs(300)));
        assert_eq!(breaker.consecutive_failures(), 0);
        assert!(breaker.cooldown_due().is_none());

        // The next failure restarts the count from 1, not 6.
        breaker.record_failure();
        assert_eq!(breaker.consecutive_failures(), 1);
    }

    #[test]
    fn success_clears_the_streak() {
        let mut breaker = CircuitBreaker::new(5, Duration::from_secs(300));
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        assert_eq!(breaker.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn retry_succeeds_after_transient_block() {
        let mut breaker = CircuitBreaker::new(5, Duration::from_secs(300));
        let mut calls = 0u32;
        let result = with_navigation_retry(&mut breaker, BackoffPolicy::zero(), 3, || {
            calls += 1;
            let outcome = if calls < 3 { Err(blocked()) } else { Ok(42u32) };
            async move { outcome }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
        // Success cleared the two recorded failures.
        assert_eq!(breaker.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn retry_exhausts_attempts_and_keeps_failures() {
        let mut breaker = CircuitBreaker::new(5, Duration::from_secs(300));
        let mut calls = 0u32;
        let result: Result<u32, _> =
            with_navigation_retry(&mut breaker, BackoffPolicy::zero(), 3, || {
                calls += 1;
                async { Err(nav_error()) }
            })
            .await;

        assert_eq!(calls, 3);
        assert!(matches!(result, Err(ScrapeError::Navigation { .. })));
        assert_eq!(breaker.consecutive_failures(), 3);
    }

    #[test]
    fn delay_bounds_double_outside_ci() {
        let ci = DelayBounds::scaled(2000, 5000, true, 0, 1500);
        let local = DelayBounds::scaled(2000, 5000, false, 0, 1500);
        assert_eq!(ci, DelayBounds { min_ms: 2000, max_ms: 5000 });
        assert_eq!(local, DelayBounds { min_ms: 4000, max_ms: 10000 });
    }

    #[test]
    fn delay_bounds_inflate_with_failures() {
        let bounds = DelayBounds::scaled(2000, 5000, true, 3, 1500);
        assert_eq!(bounds.min_ms, 2000 + 4500);
        assert_eq!(bounds.max_ms, 5000 + 4500);
    }
}
