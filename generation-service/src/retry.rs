//! Bounded retry with randomized exponential backoff.
//!
//! The policy is an explicit value wrapping a single operation, so the bound,
//! the backoff range, and the retry predicate are all independently testable.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Retry policy: at most `max_attempts` total attempts, sleeping a randomized
/// exponential delay between failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 total attempts, backoff between 1 and 10 seconds.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(10))
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` counts the first attempt too and must
    /// be at least 1.
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay,
        }
    }

    /// Runs `operation`, retrying while `should_retry` accepts the error and
    /// the attempt budget is not spent.
    ///
    /// Errors rejected by the predicate propagate immediately. When the budget
    /// runs out the error of the final attempt is returned unchanged.
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut failures = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if failures >= self.max_attempts || !should_retry(&err) {
                        return Err(err);
                    }
                    let delay = self.backoff_delay(failures);
                    tracing::warn!(
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        "瞬时过载，退避后重试"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Picks a uniformly random delay in `[min, min(max, min * 2^failures)]`.
    fn backoff_delay(&self, failures: u32) -> Duration {
        let min_ms = self.min_delay.as_millis() as u64;
        let cap_ms = self.max_delay.as_millis() as u64;
        let exp_ms = min_ms
            .saturating_mul(1u64 << failures.min(16))
            .clamp(min_ms, cap_ms.max(min_ms));
        let ms = rand::thread_rng().gen_range(min_ms..=exp_ms);
        Duration::from_millis(ms)
    }
}
