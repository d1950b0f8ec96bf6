//! Storage module for persisting the listing dataset
//!
//! This module handles everything that touches the dataset on disk:
//! - CSV reads, appends and crash-safe rewrites
//! - Timestamped backups
//! - The in-memory dedup ledger seeded from the dataset

mod backup;
mod csv_store;
mod ledger;
mod traits;

pub use backup::{create_backup, create_backup_at, BACKUP_TIMESTAMP_FORMAT};
pub use csv_store::CsvStore;
pub use ledger::{Admission, DedupLedger};
pub use traits::{ListingStore, SaveMode, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the CSV store described by the output configuration
pub fn open_store(output: &OutputConfig) -> CsvStore {
    CsvStore::new(&output.csv_path, &output.backup_dir)
}
