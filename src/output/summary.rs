//! Markdown run summary generation
//!
//! This module generates a human-readable markdown report of a crawl run:
//! run metadata, the crawl report, dataset statistics and a few sample rows.

use crate::crawler::CrawlReport;
use crate::output::stats::{format_value, DatasetStatistics};
use crate::output::OutputResult;
use crate::record::{ListingRecord, COLUMNS};
use crate::storage::ListingStore;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Number of dataset rows shown in the report
pub const SAMPLE_ROWS: usize = 5;

/// Everything that goes into one report
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub generated_at: DateTime<Local>,
    pub config_hash: Option<String>,
    pub report: Option<CrawlReport>,
    pub statistics: DatasetStatistics,
    pub samples: Vec<ListingRecord>,
}

impl RunSummary {
    /// Builds a summary from the current contents of `store`
    pub fn from_store<S: ListingStore>(
        store: &S,
        config_hash: Option<String>,
        report: Option<CrawlReport>,
    ) -> OutputResult<Self> {
        let records = store.read_all()?;
        Ok(Self {
            generated_at: Local::now(),
            config_hash,
            report,
            statistics: DatasetStatistics::from_records(&records),
            samples: records.into_iter().take(SAMPLE_ROWS).collect(),
        })
    }
}

/// Writes the markdown summary to `output_path`
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Summary report saved to {}", output_path.display());
    Ok(())
}

fn optional_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Smartphone Scraping Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    if let Some(report) = &summary.report {
        md.push_str("## Crawl Report\n\n");
        md.push_str(&format!("- **Pages Visited**: {}\n", report.pages_visited));
        md.push_str(&format!(
            "- **Pages With New Records**: {}\n",
            report.pages_with_records
        ));
        md.push_str(&format!("- **Pages Failed**: {}\n", report.pages_failed));
        md.push_str(&format!("- **Records Saved**: {}\n", report.records_saved));
        md.push_str(&format!(
            "- **Duplicates Skipped**: {}\n",
            report.duplicates_skipped
        ));
        md.push_str(&format!("- **Stopped Because**: {}\n", report.stop_reason));
        md.push_str(&format!(
            "- **Output File**: {}\n\n",
            report.output_path.display()
        ));
    }

    let stats = &summary.statistics;
    md.push_str("## Dataset Statistics\n\n");
    md.push_str(&format!("Total rows: {}\n\n", stats.total_rows));
    md.push_str("| Column | Count | Min | Max | Mean |\n");
    md.push_str("|--------|-------|-----|-----|------|\n");
    for column in &stats.numeric {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            column.column,
            column.count,
            format_value(column.min),
            format_value(column.max),
            format_value(column.mean)
        ));
    }
    md.push('\n');

    md.push_str("## Missing Values\n\n");
    md.push_str("| Column | Missing |\n");
    md.push_str("|--------|---------|\n");
    for (column, count) in &stats.missing {
        md.push_str(&format!("| {} | {} |\n", column, count));
    }
    md.push('\n');

    md.push_str("## Sample Data\n\n");
    if summary.samples.is_empty() {
        md.push_str("_No rows in the dataset._\n");
    } else {
        md.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
        md.push_str(&format!("|{}\n", "---|".repeat(COLUMNS.len())));
        for record in &summary.samples {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                escape_cell(&record.name),
                optional_cell(record.price),
                optional_cell(record.ram),
                optional_cell(record.storage),
                optional_cell(record.camera),
                optional_cell(record.screen_size),
                optional_cell(record.battery),
                optional_cell(record.release_year)
            ));
        }
    }

    md
}
