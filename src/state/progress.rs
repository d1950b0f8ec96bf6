/// Crawl-wide progress and termination
use crate::state::PageOutcome;
use std::fmt;

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured end page was processed
    EndPageReached(u32),

    /// This many consecutive pages yielded no new records
    EmptyPageStreak(u32),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndPageReached(page) => write!(f, "reached end page {}", page),
            Self::EmptyPageStreak(count) => {
                write!(f, "{} consecutive pages without new products", count)
            }
        }
    }
}

/// Running counters for one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlProgress {
    max_empty_pages: u32,
    pub consecutive_empty: u32,
    pub pages_visited: u32,
    pub pages_with_records: u32,
    pub pages_failed: u32,
    pub records_saved: usize,
    pub duplicates_skipped: usize,
}

impl CrawlProgress {
    pub fn new(max_empty_pages: u32) -> Self {
        Self {
            max_empty_pages,
            ..Self::default()
        }
    }

    /// Folds one page outcome into the counters
    ///
    /// Returns a stop reason once the empty-page streak reaches the limit.
    /// A persistence failure leaves the streak where it was.
    pub fn record(&mut self, outcome: &PageOutcome) -> Option<StopReason> {
        self.pages_visited += 1;
        self.records_saved += outcome.records_saved();
        self.duplicates_skipped += outcome.duplicates();

        if outcome.is_error() {
            self.pages_failed += 1;
        }

        if outcome.is_success() {
            self.pages_with_records += 1;
            self.consecutive_empty = 0;
        } else if outcome.is_empty() {
            self.consecutive_empty += 1;
            tracing::warn!(
                "No new products on page ({}/{} consecutive)",
                self.consecutive_empty,
                self.max_empty_pages
            );
        }

        if self.consecutive_empty >= self.max_empty_pages {
            Some(StopReason::EmptyPageStreak(self.consecutive_empty))
        } else {
            None
        }
    }

    /// Whether the page just recorded completes a backup interval
    pub fn backup_due(&self, outcome: &PageOutcome, interval: u32) -> bool {
        outcome.is_success() && interval > 0 && self.pages_with_records % interval == 0
    }
}
