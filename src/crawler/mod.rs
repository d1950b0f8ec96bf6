//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Page-level retry policy
//! - Randomized pacing between requests
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod pacing;
mod retry;

pub use coordinator::{page_url, run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use pacing::PageDelay;
pub use retry::{Backoff, RetryPolicy};
