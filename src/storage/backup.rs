//! Timestamped backups of the dataset
//!
//! Backups are plain copies named `<stem>_<YYYYMMDD_HHMMSS><ext>` inside a
//! backup directory. They are never read back or deleted automatically.

use crate::storage::traits::{StorageError, StorageResult};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Timestamp format used in backup file names
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copies `path` into `backup_dir` using the current local time
///
/// # Returns
///
/// * `Ok(Some(PathBuf))` - Path of the new backup
/// * `Ok(None)` - `path` does not exist; nothing was written
/// * `Err(StorageError)` - The directory or copy could not be written
pub fn create_backup(path: &Path, backup_dir: &Path) -> StorageResult<Option<PathBuf>> {
    create_backup_at(path, backup_dir, Local::now())
}

/// Copies `path` into `backup_dir`, stamping the name with `now`
///
/// If a backup with the same second already exists, a `_<n>` suffix is added
/// so earlier backups are never overwritten.
pub fn create_backup_at(
    path: &Path,
    backup_dir: &Path,
    now: DateTime<Local>,
) -> StorageResult<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    std::fs::create_dir_all(backup_dir).map_err(|source| StorageError::Io {
        path: backup_dir.to_path_buf(),
        source,
    })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let timestamp = now.format(BACKUP_TIMESTAMP_FORMAT).to_string();

    let mut backup_path = backup_dir.join(format!("{}_{}{}", stem, timestamp, extension));
    let mut counter = 1;
    while backup_path.exists() {
        backup_path = backup_dir.join(format!("{}_{}_{}{}", stem, timestamp, counter, extension));
        counter += 1;
    }

    std::fs::copy(path, &backup_path).map_err(|source| StorageError::Io {
        path: backup_path.clone(),
        source,
    })?;

    tracing::info!("Backup created: {}", backup_path.display());
    Ok(Some(backup_path))
}
