/// Per-page results of the crawl loop
///
/// Every visited page ends in exactly one of these outcomes, which is what
/// drives the empty-page streak and the backup cadence.
use std::fmt;

/// Terminal result of processing one catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// At least one new record was accepted and persisted
    Saved {
        records: usize,
        duplicates: usize,
        unpriced: usize,
    },

    /// Nothing was accepted: no containers, or every product was dropped
    Empty {
        containers: usize,
        duplicates: usize,
        unpriced: usize,
    },

    /// The page could not be fetched after all retries
    FetchFailed { error: String },

    /// Records were accepted but could not be written
    PersistFailed { records: usize, error: String },
}

impl PageOutcome {
    /// Returns true if the page counts toward the empty-page streak
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Returns true if this page persisted records
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::PersistFailed { .. })
    }

    /// Number of records this page added to the dataset
    pub fn records_saved(&self) -> usize {
        match self {
            Self::Saved { records, .. } => *records,
            _ => 0,
        }
    }

    /// Number of products dropped as already-seen
    pub fn duplicates(&self) -> usize {
        match self {
            Self::Saved { duplicates, .. } | Self::Empty { duplicates, .. } => *duplicates,
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Saved { .. } => "saved",
            Self::Empty { .. } => "empty",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::PersistFailed { .. } => "persist_failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved {
                records,
                duplicates,
                ..
            } => write!(f, "saved {} records ({} duplicates)", records, duplicates),
            Self::Empty { containers, .. } => {
                write!(f, "no new records from {} containers", containers)
            }
            Self::FetchFailed { error } => write!(f, "fetch failed: {}", error),
            Self::PersistFailed { records, error } => {
                write!(f, "failed to persist {} records: {}", records, error)
            }
        }
    }
}
