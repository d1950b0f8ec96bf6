//! Retry policies shared by the fetcher and the crawl loop
//!
//! Two layers retry independently: the fetcher retries transport errors and
//! retryable statuses with exponential backoff, and the crawl loop retries a
//! whole page fetch with a linearly growing wait.

use crate::config::{CrawlConfig, HttpConfig};
use std::future::Future;
use std::time::Duration;

/// How long to wait after a failed attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// `factor * 2^(n-1)` seconds after the n-th failure
    Exponential { factor: f64 },

    /// `base * n` after the n-th failure
    Linear { base: Duration },
}

/// Bounded retry with a backoff schedule
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Policy for a single HTTP request: the first try plus `max-retries` retries
    pub fn for_http(config: &HttpConfig) -> Self {
        Self::new(
            config.max_retries.saturating_add(1),
            Backoff::Exponential {
                factor: config.backoff_factor,
            },
        )
    }

    /// Policy for a whole page: `max-retries` attempts in total
    pub fn for_pages(config: &CrawlConfig) -> Self {
        Self::new(
            config.max_retries,
            Backoff::Linear {
                base: Duration::from_secs(config.retry_delay),
            },
        )
    }

    /// Wait before the next attempt, given how many attempts have failed
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let n = failed_attempts.max(1);
        match &self.backoff {
            Backoff::Exponential { factor } => {
                let secs = factor * 2f64.powi(n as i32 - 1);
                if secs.is_finite() && secs > 0.0 {
                    Duration::from_secs_f64(secs)
                } else {
                    Duration::ZERO
                }
            }
            Backoff::Linear { base } => base.saturating_mul(n),
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, or runs out of attempts
    ///
    /// `is_retryable` decides whether an error is worth another attempt.
    /// The last error is returned when attempts are exhausted.
    pub async fn run<T, E, F, Fut, R>(
        &self,
        label: &str,
        mut operation: F,
        is_retryable: R,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    let wait = self.delay_for(attempt);
                    tracing::warn!("Error accessing {}: {}", label, e);
                    tracing::info!(
                        "Retrying in {:.1} seconds... (Attempt {}/{})",
                        wait.as_secs_f64(),
                        attempt,
                        self.max_attempts
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
