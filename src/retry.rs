//! Bounded retry with exponential backoff for network-bound operations.
//!
//! The policy is plain data: attempt count, initial delay, multiplier.
//! Delay computation is pure arithmetic so it can be tested without
//! sleeping; only [`RetryPolicy::run`] actually waits.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

/// Retry policy for operations that may fail transiently.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Factor applied to the delay after each failed attempt.
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            multiplier,
        }
    }

    /// Delay to sleep after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        self.initial_delay.mul_f64(factor)
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted,
    /// sleeping between attempts. The final error is returned as-is.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= self.max_attempts {
                        error!(
                            op = op_name,
                            attempt,
                            max = self.max_attempts,
                            error = %e,
                            "operation failed, retries exhausted"
                        );
                        return Err(e);
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        op = op_name,
                        attempt,
                        max = self.max_attempts,
                        ?delay,
                        error = %e,
                        "operation failed, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl From<&crate::config::RetryConfig> for RetryPolicy {
    fn from(cfg: &crate::config::RetryConfig) -> Self {
        RetryPolicy::new(
            cfg.max_attempts,
            Duration::from_secs(cfg.initial_delay_secs),
            cfg.multiplier,
        )
    }
}
