//! Retry with exponential backoff for rendering requests.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};

/// Configuration for render retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts after the first one; total attempts = max_retries + 1
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Whether to add up to 25% random jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let base = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_millis() as f64).max(0.0) as u64;

        let jitter = if self.jitter && capped > 0 {
            fastrand::u64(0..=capped / 4)
        } else {
            0
        };

        Duration::from_millis(capped + jitter).min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent.
///
/// After the budget is spent the last retryable error is wrapped in
/// [`RenderError::RetriesExhausted`] so callers can tell it apart from an
/// engine-reported failure.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.total_attempts();
    let mut last_error = None;

    for attempt in 1..=attempts {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "Operation '{}' succeeded on attempt {}/{}",
                        operation_name, attempt, attempts
                    );
                }
                return Ok(result);
            }
            Err(err) if !err.is_retryable() => {
                debug!(
                    "Operation '{}' failed with non-retryable error: {}",
                    operation_name, err
                );
                return Err(err);
            }
            Err(err) => {
                if attempt < attempts {
                    let delay = config.delay_for(attempt);
                    warn!(
                        "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                        operation_name, attempt, attempts, delay, err
                    );
                    sleep(delay).await;
                } else {
                    warn!(
                        "Operation '{}' failed after {} attempts: {}",
                        operation_name, attempts, err
                    );
                }
                last_error = Some(err);
            }
        }
    }

    Err(RenderError::RetriesExhausted {
        attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt was made".to_string()),
    })
}
