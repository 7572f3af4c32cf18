//! Retry logic with exponential backoff
//!
//! Cloud API calls (DescribeInstances, GetMetricStatistics) fail transiently
//! under throttling and network hiccups. This module wraps them in an
//! exponential backoff loop with jitter. Errors that are not retryable per
//! `IsRetryable` abort immediately.

use crate::error::{CostctlError, IsRetryable, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Exponential backoff policy for transient failures
pub struct ExponentialBackoff {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.1,
        }
    }

    /// Policy for cloud API calls (5 attempts)
    pub fn for_cloud_api() -> Self {
        Self::new(5)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self.initial_delay.as_millis() as f64 * 2f64.powi(attempt as i32);
        let delay_ms = exponential.min(self.max_delay.as_millis() as f64);

        // Jitter to avoid synchronized retries
        let jitter = delay_ms * self.jitter_factor * fastrand::f64();
        Duration::from_millis((delay_ms + jitter) as u64)
    }

    /// Run `op` until it succeeds, a non-retryable error occurs, or attempts run out
    pub async fn run<F, Fut, T>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        for attempt in 0..self.max_attempts {
            match op().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        warn!("Non-retryable error, aborting: {}", e);
                        return Err(e);
                    }

                    if attempt == self.max_attempts - 1 {
                        warn!("Max retries ({}) reached", self.max_attempts);
                        return Err(CostctlError::Retryable {
                            attempt: attempt + 1,
                            max_attempts: self.max_attempts,
                            reason: format!("{}", e),
                            source: Some(Box::new(e)),
                        });
                    }

                    let backoff = self.delay_for(attempt);
                    warn!(
                        "Retryable error (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.max_attempts,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        // Only reachable with a zero-attempt policy
        Err(CostctlError::Retryable {
            attempt: 0,
            max_attempts: self.max_attempts,
            reason: "no attempts made".to_string(),
            source: None,
        })
    }
}
