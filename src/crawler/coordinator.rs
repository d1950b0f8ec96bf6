//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the page-by-page crawl loop:
//! - Seeding the dedup ledger from the existing dataset
//! - Fetching each catalog page with page-level retries
//! - Extracting and filtering listings
//! - Persisting accepted listings and taking backups
//! - Deciding when to stop

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::pacing::PageDelay;
use crate::crawler::retry::RetryPolicy;
use crate::extract::extract_page;
use crate::state::{CrawlProgress, PageOutcome, StopReason};
use crate::storage::{self, CsvStore, DedupLedger, ListingStore};
use crate::Result;
use std::path::PathBuf;
use url::Url;

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    pub pages_visited: u32,
    pub pages_with_records: u32,
    pub pages_failed: u32,
    pub records_saved: usize,
    pub duplicates_skipped: usize,
    pub stop_reason: StopReason,
    pub output_path: PathBuf,
}

impl CrawlReport {
    fn from_progress(progress: &CrawlProgress, stop_reason: StopReason, output_path: PathBuf) -> Self {
        Self {
            pages_visited: progress.pages_visited,
            pages_with_records: progress.pages_with_records,
            pages_failed: progress.pages_failed,
            records_saved: progress.records_saved,
            duplicates_skipped: progress.duplicates_skipped,
            stop_reason,
            output_path,
        }
    }
}

/// Builds the URL of catalog page `page`
///
/// Page 1 is the base URL itself; later pages add a `page=<n>` query pair,
/// keeping whatever query the base URL already carries.
pub fn page_url(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    if page > 1 {
        url.query_pairs_mut().append_pair("page", &page.to_string());
    }
    url
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    base_url: Url,
    fetcher: Fetcher,
    page_policy: RetryPolicy,
    pacing: PageDelay,
    store: CsvStore,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - A validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The base URL or HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let base_url = Url::parse(&config.source.base_url)?;
        let fetcher = Fetcher::new(&config.http)?;
        let page_policy = RetryPolicy::for_pages(&config.crawl);
        let pacing = PageDelay::from_config(&config.crawl);
        let store = storage::open_store(&config.output);

        Ok(Self {
            config,
            base_url,
            fetcher,
            page_policy,
            pacing,
            store,
        })
    }

    pub fn page_url(&self, page: u32) -> Url {
        page_url(&self.base_url, page)
    }

    pub fn store(&self) -> &CsvStore {
        &self.store
    }

    /// Runs the crawl loop until the end page or the empty-page limit
    ///
    /// Individual page failures never abort the run; they are logged and the
    /// loop moves on to the next page.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        let crawl = self.config.crawl.clone();

        if self.store.exists() {
            self.snapshot("initial");
        }

        let mut ledger = DedupLedger::from_store(&self.store);
        tracing::info!(
            "Found {} existing phones in {}",
            ledger.len(),
            self.store.path().display()
        );

        let mut progress = CrawlProgress::new(crawl.max_empty_pages);
        let mut page = crawl.start_page;

        let stop_reason = loop {
            if let Some(end) = crawl.end_page {
                if page > end {
                    break StopReason::EndPageReached(end);
                }
            }

            let url = self.page_url(page);
            tracing::info!("Scraping page {}: {}", page, url);

            let outcome = match self.fetch_with_retries(&url).await {
                Ok(html) => self.process_page(page, &html, &mut ledger),
                Err(e) => {
                    tracing::error!(
                        "Failed to access page {} after {} attempts: {}",
                        page,
                        self.page_policy.max_attempts,
                        e
                    );
                    PageOutcome::FetchFailed {
                        error: e.to_string(),
                    }
                }
            };
            tracing::debug!("Page {} outcome: {}", page, outcome);

            let stop = progress.record(&outcome);

            if progress.backup_due(&outcome, crawl.backup_interval) {
                self.snapshot("interval");
            }
            if matches!(outcome, PageOutcome::PersistFailed { .. }) {
                self.snapshot("after error");
            }

            if let Some(reason) = stop {
                break reason;
            }

            page += 1;
            if crawl.end_page.map_or(true, |end| page <= end) {
                self.pacing.wait().await;
            }
        };

        tracing::info!("Stopping crawl: {}", stop_reason);
        tracing::info!(
            "Saved {} new phones to {}",
            progress.records_saved,
            self.store.path().display()
        );

        Ok(CrawlReport::from_progress(
            &progress,
            stop_reason,
            self.store.path().to_path_buf(),
        ))
    }

    async fn fetch_with_retries(&self, url: &Url) -> std::result::Result<String, FetchError> {
        let label = url.as_str();
        self.page_policy
            .run(label, || self.fetcher.fetch_page(label), |_| true)
            .await
    }

    /// Extracts, filters and persists one fetched page
    fn process_page(&mut self, page: u32, html: &str, ledger: &mut DedupLedger) -> PageOutcome {
        let extraction = extract_page(html, page);
        let containers = extraction.containers;
        let requires_price = extraction.variant.requires_price();

        let admission = ledger.admit(extraction.records, requires_price);

        if admission.accepted.is_empty() {
            tracing::warn!("No phones extracted from page {}", page);
            return PageOutcome::Empty {
                containers,
                duplicates: admission.duplicates,
                unpriced: admission.unpriced,
            };
        }

        let append = self.store.exists();
        match self.store.save_or_append(&admission.accepted, append) {
            Ok(_) => {
                tracing::info!(
                    "Saved {} phones from page {}",
                    admission.accepted.len(),
                    page
                );
                PageOutcome::Saved {
                    records: admission.accepted.len(),
                    duplicates: admission.duplicates,
                    unpriced: admission.unpriced,
                }
            }
            Err(e) => {
                tracing::error!("Error processing page {}: {}", page, e);
                ledger.forget(admission.accepted.iter().map(|r| r.name.as_str()));
                PageOutcome::PersistFailed {
                    records: admission.accepted.len(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Takes a backup, logging rather than propagating failures
    fn snapshot(&self, reason: &str) {
        match self.store.create_backup() {
            Ok(Some(path)) => tracing::debug!("{} backup at {}", reason, path.display()),
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to create {} backup: {}", reason, e),
        }
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use handset_harvest::config::Config;
/// use handset_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} new listings", report.records_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.source.base_url = "https://www.pricebook.co.id/smartphone".to_string();
        config.output.csv_path = dir.join("data.csv").to_string_lossy().into_owned();
        config.output.backup_dir = dir.join("backups").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_page_url_first_page_is_base() {
        let base = Url::parse("https://www.pricebook.co.id/smartphone").unwrap();
        assert_eq!(
            page_url(&base, 1).as_str(),
            "https://www.pricebook.co.id/smartphone"
        );
        assert_eq!(
            page_url(&base, 7).as_str(),
            "https://www.pricebook.co.id/smartphone?page=7"
        );
    }

    #[test]
    fn test_page_url_keeps_existing_query() {
        let base = Url::parse("https://example.com/phones?sort=new").unwrap();
        assert_eq!(
            page_url(&base, 2).as_str(),
            "https://example.com/phones?sort=new&page=2"
        );
    }

    #[test]
    fn test_coordinator_creation() {
        let dir = tempdir().unwrap();
        let coordinator = Coordinator::new(create_test_config(dir.path())).unwrap();
        assert_eq!(
            coordinator.page_url(3).as_str(),
            "https://www.pricebook.co.id/smartphone?page=3"
        );
        assert!(!coordinator.store().exists());
    }

    #[test]
    fn test_coordinator_rejects_bad_url() {
        let dir = tempdir().unwrap();
        let mut config = create_test_config(dir.path());
        config.source.base_url = "not a url".to_string();
        assert!(Coordinator::new(config).is_err());
    }

    #[test]
    fn test_process_page_persists_and_dedups() {
        let dir = tempdir().unwrap();
        let mut coordinator = Coordinator::new(create_test_config(dir.path())).unwrap();
        let mut ledger = DedupLedger::new();

        let html = r#"<html><body>
            <div class="styles_productPanel__Tlvp6"><h2>Phone A</h2><span>Rp 1.000.000</span></div>
            <div class="styles_productPanel__Tlvp6"><h2>Phone B</h2><span>Rp 2.000.000</span></div>
            <div class="styles_productPanel__Tlvp6"><h2>Phone C</h2><span>no price</span></div>
        </body></html>"#;

        let first = coordinator.process_page(1, html, &mut ledger);
        assert_eq!(
            first,
            PageOutcome::Saved {
                records: 2,
                duplicates: 0,
                unpriced: 1
            }
        );

        let second = coordinator.process_page(2, html, &mut ledger);
        assert_eq!(
            second,
            PageOutcome::Empty {
                containers: 3,
                duplicates: 2,
                unpriced: 1
            }
        );

        assert_eq!(coordinator.store().read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_process_page_without_containers() {
        let dir = tempdir().unwrap();
        let mut coordinator = Coordinator::new(create_test_config(dir.path())).unwrap();
        let mut ledger = DedupLedger::new();

        let outcome = coordinator.process_page(5, "<html><body><p>gone</p></body></html>", &mut ledger);
        assert!(outcome.is_empty());
        assert!(!coordinator.store().exists());
    }
}
