//! Randomized delay between page requests

use crate::config::CrawlConfig;
use std::time::Duration;

/// Uniform random wait between two bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelay {
    min_ms: u64,
    max_ms: u64,
}

impl PageDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.min_delay_ms, config.max_delay_ms)
    }

    /// Picks the next wait
    pub fn next_delay(&self) -> Duration {
        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }

    /// Sleeps for a freshly picked wait and returns it
    pub async fn wait(&self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::info!(
                "Waiting {:.2} seconds before next request...",
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
