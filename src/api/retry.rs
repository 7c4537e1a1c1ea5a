use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// Wait applied before retrying a rate-limited (HTTP 429) attempt.
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(10);

/// Bounded retry loop: `max_retries` extra attempts after the first one.
///
/// Rate-limited failures wait `rate_limit_backoff` first; other retryable
/// failures are retried immediately. Once the budget is spent the last error is
/// returned as-is. Non-retryable errors are returned on the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub rate_limit_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            rate_limit_backoff: RATE_LIMIT_BACKOFF,
        }
    }

    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    /// Runs `operation` until it succeeds or the budget is exhausted. The
    /// closure receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut remaining = self.max_retries;
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if remaining > 0 && e.is_retryable() => {
                    if e.is_rate_limited() {
                        log::warn!(
                            "Attempt {} rate limited, waiting {}s ({} retries left)",
                            attempt,
                            self.rate_limit_backoff.as_secs(),
                            remaining
                        );
                        tokio::time::sleep(self.rate_limit_backoff).await;
                    } else {
                        log::warn!(
                            "Attempt {} failed: {} ({} retries left)",
                            attempt,
                            e,
                            remaining
                        );
                    }
                    remaining -= 1;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        log::error!("Giving up after {} attempts: {}", attempt, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}
