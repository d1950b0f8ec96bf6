//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageOutcome`: The terminal result of processing one catalog page
//! - `CrawlProgress`: Run-wide counters and the empty-page streak
//! - `StopReason`: Why the crawl loop ended

mod page_outcome;
mod progress;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use progress::{CrawlProgress, StopReason};
