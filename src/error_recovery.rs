// src/error_recovery.rs
//! Retry with linear backoff for transient network failures.

use crate::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::error::AppError;
use std::time::Duration;

/// How many times an outbound call is attempted and how long to wait between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Attempt `n` is followed by a pause of `base_delay * n`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// Runs `operation`, retrying it while it fails with a connection reset or
/// timeout.
///
/// Any other error is returned at once, without a delay. When every attempt
/// fails transiently the last error is returned.
pub async fn retry_transient<F, T, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let Some(failure) = e.transient_failure() else {
                    return Err(e);
                };

                if attempt >= policy.max_attempts {
                    log::warn!(
                        "Giving up after {} attempt(s) ({}): {}",
                        attempt,
                        failure,
                        e
                    );
                    return Err(e);
                }

                let delay = policy.delay_after(attempt);
                log::warn!(
                    "Attempt {}/{} failed ({}), retrying after {:?}",
                    attempt,
                    policy.max_attempts,
                    failure,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
