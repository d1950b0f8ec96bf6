//! Output module for dataset statistics and run reports
//!
//! This module handles:
//! - Computing statistics over the persisted dataset
//! - Generating markdown summaries of crawl runs

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, ColumnStats, DatasetStatistics};
pub use summary::{format_markdown_summary, generate_markdown_summary, RunSummary, SAMPLE_ROWS};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
