//! Handset-Harvest main entry point
//!
//! This is the command-line interface for the smartphone catalog scraper.

use anyhow::Context;
use clap::Parser;
use handset_harvest::config::{self, load_config_with_hash, Config};
use handset_harvest::crawler::{page_url, run_crawl, CrawlReport};
use handset_harvest::output::{generate_markdown_summary, load_statistics, print_statistics, RunSummary};
use handset_harvest::storage::{open_store, ListingStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Handset-Harvest: a resilient smartphone catalog scraper
///
/// Walks the paginated smartphone catalog, extracts every listing it can
/// understand and appends new ones to a CSV dataset, taking timestamped
/// backups along the way.
#[derive(Parser, Debug)]
#[command(name = "handset-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Scrape smartphone listings into a CSV dataset", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Page to start scraping from
    #[arg(long)]
    start_page: Option<u32>,

    /// Last page to scrape (unbounded when omitted)
    #[arg(long)]
    end_page: Option<u32>,

    /// Create a backup every N pages that saved records
    #[arg(long)]
    backup_interval: Option<u32>,

    /// Attempts per page before skipping it
    #[arg(long)]
    max_retries: Option<u32>,

    /// Base wait between page attempts, in seconds
    #[arg(long)]
    retry_delay: Option<u64>,

    /// CSV file to write listings to
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics for the existing dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary from the existing dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start_page) = self.start_page {
            config.crawl.start_page = start_page;
        }
        if self.end_page.is_some() {
            config.crawl.end_page = self.end_page;
        }
        if let Some(interval) = self.backup_interval {
            config.crawl.backup_interval = interval;
        }
        if let Some(max_retries) = self.max_retries {
            config.crawl.max_retries = max_retries;
        }
        if let Some(retry_delay) = self.retry_delay {
            config.crawl.retry_delay = retry_delay;
        }
        if let Some(output) = &self.output {
            config.output.csv_path = output.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, Some(hash))
        }
        None => (Config::default(), None),
    };

    cli.apply_overrides(&mut config);
    config::validate(&config).context("invalid run parameters")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config, config_hash, None)?;
    } else {
        let report = handle_crawl(config.clone()).await?;
        handle_export_summary(&config, config_hash, Some(report))?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("handset_harvest=info,warn"),
            1 => EnvFilter::new("handset_harvest=debug,info"),
            2 => EnvFilter::new("handset_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let base = url::Url::parse(&config.source.base_url)?;
    let crawl = &config.crawl;

    println!("=== Handset-Harvest Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", base);
    println!("  First page: {}", page_url(&base, crawl.start_page));
    match crawl.end_page {
        Some(end) => println!("  Pages: {} to {}", crawl.start_page, end),
        None => println!(
            "  Pages: {} onward, until {} consecutive empty pages",
            crawl.start_page, crawl.max_empty_pages
        ),
    }

    println!("\nCrawl:");
    println!("  Backup interval: {} pages", crawl.backup_interval);
    println!(
        "  Page retries: {} (base delay {}s)",
        crawl.max_retries, crawl.retry_delay
    );
    println!(
        "  Delay between pages: {}-{}ms",
        crawl.min_delay_ms, crawl.max_delay_ms
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!(
        "  Request retries: {} (backoff factor {})",
        config.http.max_retries, config.http.backoff_factor
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Backups: {}", config.output.backup_dir);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics for the dataset
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Dataset: {}\n", config.output.csv_path);

    let store = open_store(&config.output);
    if !store.exists() {
        println!("No dataset found.");
        return Ok(());
    }

    let stats = load_statistics(&store)
        .with_context(|| format!("failed to read {}", config.output.csv_path))?;
    print_statistics(&stats);

    Ok(())
}

/// Writes the markdown summary for the current dataset
fn handle_export_summary(
    config: &Config,
    config_hash: Option<String>,
    report: Option<CrawlReport>,
) -> anyhow::Result<()> {
    let store = open_store(&config.output);
    let summary_path = Path::new(&config.output.summary_path);

    tracing::info!("Loading dataset from {}", config.output.csv_path);
    let summary = RunSummary::from_store(&store, config_hash, report)
        .with_context(|| format!("failed to read {}", config.output.csv_path))?;

    generate_markdown_summary(&summary, summary_path)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<CrawlReport> {
    tracing::info!(
        "Starting scrape of {} from page {}",
        config.source.base_url,
        config.crawl.start_page
    );

    let report = run_crawl(config).await.context("crawl could not start")?;

    tracing::info!(
        "Scraping completed. Total new phones scraped: {}",
        report.records_saved
    );
    tracing::info!("Data saved to {}", report.output_path.display());
    if report.pages_failed > 0 {
        tracing::warn!("{} pages failed and were skipped", report.pages_failed);
    }

    Ok(report)
}
