use serde::Deserialize;

/// Main configuration structure for Handset-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Catalog being scraped
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// First catalog page; later pages are addressed as `<base-url>?page=<n>`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// First page index to fetch (1-based)
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last page index to fetch (inclusive); unbounded when absent
    #[serde(rename = "end-page", default)]
    pub end_page: Option<u32>,

    /// Take a backup every N pages that persisted records
    #[serde(rename = "backup-interval", default = "default_backup_interval")]
    pub backup_interval: u32,

    /// Attempts per page made by the crawl loop before skipping the page
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base wait between crawl-loop attempts (seconds, multiplied by attempt number)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Consecutive pages without accepted records that end the crawl
    #[serde(rename = "max-empty-pages", default = "default_max_empty_pages")]
    pub max_empty_pages: u32,

    /// Lower bound of the randomized pause between pages (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized pause between pages (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            end_page: None,
            backup_interval: default_backup_interval(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            max_empty_pages: default_max_empty_pages(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries after the first attempt
    #[serde(rename = "max-retries", default = "default_http_max_retries")]
    pub max_retries: u32,

    /// Exponential backoff factor (seconds): factor * 2^(retry - 1)
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Status codes that are retried with backoff
    #[serde(rename = "retry-statuses", default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_http_max_retries(),
            backoff_factor: default_backoff_factor(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV dataset
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,

    /// Directory receiving timestamped backups of the dataset
    #[serde(rename = "backup-dir", default = "default_backup_dir")]
    pub backup_dir: String,

    /// Path to the markdown run summary
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            backup_dir: default_backup_dir(),
            summary_path: default_summary_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.pricebook.co.id/smartphone".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_backup_interval() -> u32 {
    5
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    30
}

fn default_max_empty_pages() -> u32 {
    3
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    3000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_http_max_retries() -> u32 {
    5
}

fn default_backoff_factor() -> f64 {
    0.3
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

fn default_csv_path() -> String {
    "smartphone_data.csv".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_summary_path() -> String {
    "scraping_summary.md".to_string()
}
