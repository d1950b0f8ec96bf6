//! CSV dataset store
//!
//! This module provides the CSV-backed implementation of the ListingStore
//! trait. The file always starts with a single header row in the fixed
//! column order; appends never repeat the header.

use crate::record::{ListingRecord, COLUMNS};
use crate::storage::backup;
use crate::storage::traits::{ListingStore, SaveMode, StorageError, StorageResult};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// CSV file store for listing records
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl CsvStore {
    /// Creates a store for `path`, backing up into `backup_dir`
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StorageError {
        StorageError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn ensure_parent_dir(&self) -> StorageResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))
            }
            _ => Ok(()),
        }
    }

    /// Serializes `records` into `file`, optionally preceded by the header
    fn write_rows(&self, file: File, records: &[ListingRecord], header: bool) -> StorageResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if header {
            writer
                .write_record(COLUMNS)
                .map_err(|e| self.csv_error(e))?;
        }
        for record in records {
            writer.serialize(record).map_err(|e| self.csv_error(e))?;
        }

        writer.flush().map_err(|e| self.io_error(e))?;
        let file = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;
        file.sync_all().map_err(|e| self.io_error(e))
    }

    /// Rewrites the whole file through a temporary sibling and a rename
    fn rewrite(&self, records: &[ListingRecord]) -> StorageResult<()> {
        self.ensure_parent_dir()?;
        let temp = self.temp_path();
        let file = File::create(&temp).map_err(|e| self.io_error(e))?;
        if let Err(e) = self.write_rows(file, records, true) {
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))
    }

    fn append(&self, records: &[ListingRecord]) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        // A file cut off mid-row must not glue the next row onto it
        if !ends_with_newline(&self.path).map_err(|e| self.io_error(e))? {
            file.write_all(b"\n").map_err(|e| self.io_error(e))?;
        }

        self.write_rows(file, records, false)
    }

    /// A zero-length file is treated like a missing one: it has no header yet
    fn has_content(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    fn reader(&self) -> StorageResult<csv::Reader<File>> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))
    }
}

fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    use std::io::{Read, Seek, SeekFrom};

    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl ListingStore for CsvStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn save_or_append(
        &mut self,
        records: &[ListingRecord],
        append: bool,
    ) -> StorageResult<SaveMode> {
        let mode = if !self.has_content() {
            self.rewrite(records)?;
            SaveMode::Created
        } else if append {
            self.append(records)?;
            SaveMode::Appended
        } else {
            self.create_backup()?;
            self.rewrite(records)?;
            SaveMode::Rewritten
        };

        tracing::debug!(
            "{} {} records in {}",
            match mode {
                SaveMode::Appended => "Appended",
                SaveMode::Created | SaveMode::Rewritten => "Wrote",
            },
            records.len(),
            self.path.display()
        );
        Ok(mode)
    }

    fn read_all(&self) -> StorageResult<Vec<ListingRecord>> {
        if !self.has_content() {
            return Ok(Vec::new());
        }

        let mut reader = self.reader()?;
        let mut records = Vec::new();
        for row in reader.deserialize::<ListingRecord>() {
            records.push(row.map_err(|e| self.csv_error(e))?);
        }
        Ok(records)
    }

    fn load_names(&self) -> StorageResult<HashSet<String>> {
        if !self.has_content() {
            return Ok(HashSet::new());
        }

        let mut reader = self.reader()?;
        let name_column = reader
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .position(|h| h.trim() == COLUMNS[0])
            .ok_or_else(|| StorageError::MissingColumn {
                path: self.path.clone(),
                column: COLUMNS[0].to_string(),
            })?;

        let mut names = HashSet::new();
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(self.csv_error(e)),
                Err(e) => {
                    tracing::warn!("Skipping unreadable row in {}: {}", self.path.display(), e);
                    continue;
                }
            };
            if let Some(name) = row.get(name_column).map(str::trim) {
                if !name.is_empty() {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn create_backup(&self) -> StorageResult<Option<PathBuf>> {
        backup::create_backup(&self.path, &self.backup_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SpecNumber;
    use tempfile::tempdir;

    fn sample(name: &str, price: u64) -> ListingRecord {
        ListingRecord {
            price: Some(price),
            ram: Some(SpecNumber::Int(8)),
            storage: Some(SpecNumber::Int(256)),
            camera: Some(50),
            screen_size: Some(6.67),
            battery: Some(5000),
            release_year: Some(2023),
            ..ListingRecord::named(name)
        }
    }

    fn store_in(dir: &Path) -> CsvStore {
        CsvStore::new(dir.join("smartphone_data.csv"), dir.join("backups"))
    }

    #[test]
    fn test_create_writes_single_header() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());

        let mode = store
            .save_or_append(&[sample("Poco X6", 4_199_000)], true)
            .unwrap();
        assert_eq!(mode, SaveMode::Created);

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("Name,Price,RAM,Storage,Camera,ScreenSize,Battery,ReleaseYear")
        );
        assert_eq!(
            lines.next(),
            Some("Poco X6,4199000,8,256,50,6.67,5000,2023")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_append_does_not_repeat_header() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());

        store.save_or_append(&[sample("A", 1)], true).unwrap();
        let mode = store
            .save_or_append(&[sample("B", 2), sample("C", 3)], true)
            .unwrap();
        assert_eq!(mode, SaveMode::Appended);

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.matches("Name,Price").count(), 1);
        assert_eq!(contents.lines().count(), 4);
        assert!(!dir.path().join("backups").exists());
    }

    #[test]
    fn test_append_repairs_truncated_last_row() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("smartphone_data.csv");
        std::fs::write(
            &store_path,
            "Name,Price,RAM,Storage,Camera,ScreenSize,Battery,ReleaseYear\nA,1,,,,,,",
        )
        .unwrap();

        let mut store = CsvStore::new(&store_path, dir.path().join("backups"));
        store.save_or_append(&[sample("B", 2)], true).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "B");
    }

    #[test]
    fn test_rewrite_backs_up_previous_file() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());

        store.save_or_append(&[sample("Old", 1)], false).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let mode = store.save_or_append(&[sample("New", 2)], false).unwrap();
        assert_eq!(mode, SaveMode::Rewritten);

        let backups: Vec<_> = std::fs::read_dir(dir.path().join("backups"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read(&backups[0]).unwrap(), before);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "New");
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_read_all_round_trip_with_missing_fields() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());

        let partial = ListingRecord {
            price: Some(1_500_000),
            ram: Some(SpecNumber::Float(1.5)),
            ..ListingRecord::named("Nokia 105")
        };
        store
            .save_or_append(&[sample("Poco X6", 4_199_000), partial.clone()], true)
            .unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records, vec![sample("Poco X6", 4_199_000), partial]);
    }

    #[test]
    fn test_load_names() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        assert!(store.load_names().unwrap().is_empty());

        store
            .save_or_append(&[sample("A", 1), sample("B", 2)], true)
            .unwrap();
        let names = store.load_names().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("A"));
        assert!(names.contains("B"));
    }

    #[test]
    fn test_load_names_without_name_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "Title,Price\nX,1\n").unwrap();

        let store = CsvStore::new(&path, dir.path().join("backups"));
        assert!(matches!(
            store.load_names(),
            Err(StorageError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_zero_length_store_gets_header_on_append() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        std::fs::write(store.path(), "").unwrap();
        assert!(store.load_names().unwrap().is_empty());
        assert!(store.read_all().unwrap().is_empty());

        let mode = store
            .save_or_append(&[sample("Redmi 13", 1_699_000)], true)
            .unwrap();
        assert_eq!(mode, SaveMode::Created);

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with(&COLUMNS.join(",")));
        assert_eq!(store.read_all().unwrap(), vec![sample("Redmi 13", 1_699_000)]);
        assert!(store.load_names().unwrap().contains("Redmi 13"));
    }

    #[test]
    fn test_load_names_skips_undecodable_rows() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let mut bytes = format!("{}\nA,1,,,,,,\n", COLUMNS.join(",")).into_bytes();
        bytes.extend_from_slice(b"Bad\xff\xfeName,2,,,,,,\n");
        bytes.extend_from_slice(b"B,3,,,,,,\n");
        std::fs::write(store.path(), bytes).unwrap();

        let names = store.load_names().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("A"));
        assert!(names.contains("B"));
    }

    #[test]
    fn test_backup_of_missing_store_is_noop() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.create_backup().unwrap().is_none());
    }
}
