//! Exponential backoff shared by every remote call.
//!
//! [`RetryPolicy::run`] re-invokes an async operation until it succeeds or the
//! attempt budget is spent. Both the search decorator
//! ([`RetrySearch`](crate::search::RetrySearch)) and the chat client
//! ([`ChatClient`](crate::narrative::ChatClient)) go through it.
//!
//! # Backoff Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=max_jitter)
//! ```
//!
//! | Setting | Default |
//! |---------|---------|
//! | attempts (including the first) | 3 |
//! | base delay | 1s |
//! | max delay | 8s |
//! | jitter | 0-250ms |

use rand::{Rng, rng};
use std::error::Error;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    #[cfg(test)]
    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    #[cfg(test)]
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Millisecond delays and no jitter, for tests.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self::default()
            .with_delays(Duration::from_millis(1), Duration::from_millis(4))
            .with_jitter(Duration::ZERO)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt.max(1) - 1).min(31) as u32;
        let delay = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=jitter_ms)
        };
        delay + Duration::from_millis(jitter)
    }

    /// Run `op` until it succeeds, backing off between failures.
    ///
    /// The last error is returned once every attempt has failed. `what` names
    /// the operation in the logs.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, Box<dyn Error>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Box<dyn Error>>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt >= self.max_attempts {
                        error!(
                            what,
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        what,
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default().with_jitter(Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(9), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_jitter_is_bounded() {
        let delay = RetryPolicy::default().backoff(1);
        assert!(delay >= Duration::from_secs(1));
        assert!(delay <= Duration::from_millis(1250));
    }

    #[tokio::test]
    async fn test_run_recovers_after_failures() {
        let calls = Cell::new(0);
        let value = RetryPolicy::fast()
            .run("op", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err::<usize, Box<dyn Error>>(format!("failure #{n}").into())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_run_returns_last_error() {
        let calls = Cell::new(0);
        let err = RetryPolicy::fast()
            .run("op", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Err::<(), Box<dyn Error>>(format!("failure #{n}").into()) }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.get(), 3);
        assert_eq!(err.to_string(), "failure #3");
    }
}
