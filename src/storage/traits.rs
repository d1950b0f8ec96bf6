//! Storage traits and error types
//!
//! This module defines the trait interface for dataset stores and
//! associated error types.

use crate::record::ListingRecord;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Dataset {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// How a save call touched the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// The store did not exist and was created with a header
    Created,
    /// The store was rewritten with a header after a backup
    Rewritten,
    /// Rows were appended without a header
    Appended,
}

/// Trait for dataset store implementations
///
/// The store is the source of truth for the crawl: the dedup ledger is
/// rebuilt from it on every start, and it is the only thing backed up.
pub trait ListingStore {
    /// Whether the store currently exists
    fn exists(&self) -> bool;

    /// Writes `records`, appending when `append` is set and the store exists
    ///
    /// A non-append write over an existing store takes a backup first.
    fn save_or_append(&mut self, records: &[ListingRecord], append: bool)
        -> StorageResult<SaveMode>;

    /// Reads every persisted record
    fn read_all(&self) -> StorageResult<Vec<ListingRecord>>;

    /// Reads the `Name` column; an absent store yields an empty set
    fn load_names(&self) -> StorageResult<HashSet<String>>;

    /// Copies the store into the backup directory
    ///
    /// Returns `None` without touching anything when the store does not exist.
    fn create_backup(&self) -> StorageResult<Option<PathBuf>>;
}
