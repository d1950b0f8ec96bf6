//! Statistics over the persisted dataset
//!
//! This module provides functionality for summarizing the CSV dataset:
//! row counts, missing values per column and ranges of numeric columns.

use crate::record::{ListingRecord, COLUMNS};
use crate::storage::{ListingStore, StorageResult};

/// Count, range and mean of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: &'static str,

    /// Number of rows with a value in this column
    pub count: usize,

    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Dataset statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStatistics {
    /// Total number of rows
    pub total_rows: usize,

    /// Missing-value count per column, in column order
    pub missing: Vec<(&'static str, usize)>,

    /// Statistics for every numeric column, in column order
    pub numeric: Vec<ColumnStats>,
}

/// Numeric cells of a record, in column order after `Name`
fn numeric_cells(record: &ListingRecord) -> [Option<f64>; 7] {
    [
        record.price.map(|v| v as f64),
        record.ram.map(|v| v.as_f64()),
        record.storage.map(|v| v.as_f64()),
        record.camera.map(f64::from),
        record.screen_size,
        record.battery.map(f64::from),
        record.release_year.map(f64::from),
    ]
}

impl DatasetStatistics {
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let mut counts = [0usize; 7];
        let mut sums = [0f64; 7];
        let mut mins = [None::<f64>; 7];
        let mut maxs = [None::<f64>; 7];
        let mut missing_names = 0;

        for record in records {
            if record.name.trim().is_empty() {
                missing_names += 1;
            }
            for (i, cell) in numeric_cells(record).iter().enumerate() {
                if let Some(value) = *cell {
                    counts[i] += 1;
                    sums[i] += value;
                    mins[i] = Some(mins[i].map_or(value, |m| m.min(value)));
                    maxs[i] = Some(maxs[i].map_or(value, |m| m.max(value)));
                }
            }
        }

        let total_rows = records.len();
        let mut missing = vec![(COLUMNS[0], missing_names)];
        missing.extend(
            COLUMNS
                .iter()
                .skip(1)
                .zip(counts.iter())
                .map(|(column, count)| (*column, total_rows - count)),
        );

        let numeric = COLUMNS
            .iter()
            .skip(1)
            .enumerate()
            .map(|(i, column)| ColumnStats {
                column: *column,
                count: counts[i],
                min: mins[i],
                max: maxs[i],
                mean: (counts[i] > 0).then(|| sums[i] / counts[i] as f64),
            })
            .collect();

        Self {
            total_rows,
            missing,
            numeric,
        }
    }

    /// Missing-value count for `column`
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.missing
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, count)| *count)
    }

    pub fn column(&self, column: &str) -> Option<&ColumnStats> {
        self.numeric.iter().find(|stats| stats.column == column)
    }
}

/// Loads statistics for everything in `store`
pub fn load_statistics<S: ListingStore>(store: &S) -> StorageResult<DatasetStatistics> {
    let records = store.read_all()?;
    Ok(DatasetStatistics::from_records(&records))
}

pub(crate) fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total rows: {}", stats.total_rows);
    println!();

    println!("Numeric Columns:");
    println!(
        "  {:<12} {:>6} {:>14} {:>14} {:>14}",
        "Column", "Count", "Min", "Max", "Mean"
    );
    for column in &stats.numeric {
        println!(
            "  {:<12} {:>6} {:>14} {:>14} {:>14}",
            column.column,
            column.count,
            format_value(column.min),
            format_value(column.max),
            format_value(column.mean)
        );
    }
    println!();

    println!("Missing Values:");
    for (column, count) in &stats.missing {
        let percentage = if stats.total_rows > 0 {
            (*count as f64 / stats.total_rows as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", column, count, percentage);
    }
}
