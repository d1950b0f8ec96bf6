//! Integration tests for the crawler
//!
//! These tests use wiremock to serve catalog pages and run the full
//! fetch, extract, dedup and persist cycle end-to-end.

use handset_harvest::config::Config;
use handset_harvest::crawler::Coordinator;
use handset_harvest::record::SpecNumber;
use handset_harvest::state::StopReason;
use handset_harvest::storage::{CsvStore, ListingStore};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests for the first catalog page, which carries no `page` parameter
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

/// Creates a test configuration pointing at the mock server, with no waiting
fn create_test_config(server_uri: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/smartphone", server_uri);
    config.crawl.min_delay_ms = 0;
    config.crawl.max_delay_ms = 0;
    config.crawl.retry_delay = 0;
    config.crawl.max_retries = 2;
    config.http.max_retries = 2;
    config.http.backoff_factor = 0.0;
    config.http.timeout_secs = 5;
    config.output.csv_path = dir.join("smartphone_data.csv").to_string_lossy().into_owned();
    config.output.backup_dir = dir.join("backups").to_string_lossy().into_owned();
    config.output.summary_path = dir.join("summary.md").to_string_lossy().into_owned();
    config
}

fn panel(name: &str, price: &str) -> String {
    format!(
        r#"<div class="styles_productPanel__Tlvp6">
            <h2 class="styles_productName__fr99s">{}</h2>
            <div class="styles_primarySpecsList__4s_rn">
                <div class="col-md-6">8GB RAM / 128GB ROM</div>
                <div class="col-md-6">50 MP</div>
                <div class="col-md-6">5000 mAh</div>
            </div>
            <span>{}</span>
        </div>"#,
        name, price
    )
}

fn panel_page(panels: &[(&str, &str)]) -> String {
    let body: String = panels.iter().map(|(n, p)| panel(n, p)).collect();
    format!("<html><body><main>{}</main></body></html>", body)
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    if page == 1 {
        Mock::given(method("GET"))
            .and(path("/smartphone"))
            .and(FirstPage)
            .respond_with(html(body))
            .mount(server)
            .await;
    } else {
        Mock::given(method("GET"))
            .and(path("/smartphone"))
            .and(query_param("page", page.to_string()))
            .respond_with(html(body))
            .mount(server)
            .await;
    }
}

fn store_for(config: &Config) -> CsvStore {
    CsvStore::new(&config.output.csv_path, &config.output.backup_dir)
}

fn backup_count(config: &Config) -> usize {
    std::fs::read_dir(&config.output.backup_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_full_crawl_saves_new_listings() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        1,
        panel_page(&[
            ("Samsung Galaxy A15", "Rp 2.499.000"),
            ("Xiaomi Redmi 13", "Rp 1.799.000"),
            ("Oppo A18", "Rp 1.599.000"),
        ]),
    )
    .await;
    mount_page(
        &mock_server,
        2,
        panel_page(&[
            ("Vivo Y28", "Rp 2.199.000"),
            ("Samsung Galaxy A15", "Rp 2.499.000"),
        ]),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.end_page = Some(2);

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_with_records, 2);
    assert_eq!(report.records_saved, 4);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(report.stop_reason, StopReason::EndPageReached(2));

    let contents = std::fs::read_to_string(&config.output.csv_path).unwrap();
    assert_eq!(contents.matches("Name,Price,RAM").count(), 1);

    let records = store_for(&config).read_all().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].name, "Samsung Galaxy A15");
    assert_eq!(records[0].price, Some(2_499_000));
    assert_eq!(records[0].camera, Some(50));
    assert_eq!(records[0].battery, Some(5000));
    assert!(records.iter().all(|r| r.ram == Some(SpecNumber::Int(8))));
    assert!(records.iter().all(|r| r.storage == Some(SpecNumber::Int(128))));
    assert!(records.iter().all(|r| r.price.is_some()));
}

#[tokio::test]
async fn test_second_run_adds_nothing() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        1,
        panel_page(&[("Poco X6", "Rp 4.199.000"), ("Poco M6", "Rp 1.999.000")]),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.end_page = Some(1);

    let first = Coordinator::new(config.clone()).unwrap().run().await.unwrap();
    assert_eq!(first.records_saved, 2);
    let after_first = std::fs::read(&config.output.csv_path).unwrap();

    let second = Coordinator::new(config.clone()).unwrap().run().await.unwrap();
    assert_eq!(second.records_saved, 0);
    assert_eq!(second.duplicates_skipped, 2);

    assert_eq!(std::fs::read(&config.output.csv_path).unwrap(), after_first);
    // The second run snapshots the existing dataset before touching it
    assert_eq!(backup_count(&config), 1);
}

#[tokio::test]
async fn test_consecutive_empty_pages_stop_crawl() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/smartphone"))
        .respond_with(html(
            "<html><body><p>Tidak ada produk</p></body></html>".to_string(),
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let existing = "Name,Price,RAM,Storage,Camera,ScreenSize,Battery,ReleaseYear\nNokia 105,299000,,,,,,\n";
    std::fs::write(&config.output.csv_path, existing).unwrap();

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.stop_reason, StopReason::EmptyPageStreak(3));
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.records_saved, 0);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);

    assert_eq!(
        std::fs::read_to_string(&config.output.csv_path).unwrap(),
        existing
    );
    assert_eq!(backup_count(&config), 1);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/smartphone"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        1,
        panel_page(&[("Realme C67", "Rp 2.299.000")]),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.end_page = Some(1);

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.records_saved, 1);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, panel_page(&[("Infinix Hot 40", "Rp 1.899.000")])).await;
    Mock::given(method("GET"))
        .and(path("/smartphone"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 3, panel_page(&[("Tecno Spark 20", "Rp 1.699.000")])).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.end_page = Some(3);

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.records_saved, 2);
    assert_eq!(report.stop_reason, StopReason::EndPageReached(3));

    let names: Vec<String> = store_for(&config)
        .read_all()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Infinix Hot 40", "Tecno Spark 20"]);
}

#[tokio::test]
async fn test_newest_layout_keeps_unpriced_listings() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut body = String::from("<html><body>");
    for i in 1..=6 {
        let details = if i % 2 == 0 {
            format!("Rp {}.499.000 | 6.6 inch | 5000 mAh | 2024", i)
        } else {
            "Lihat detail | 50 MP".to_string()
        };
        body.push_str(&format!(
            r#"<section><h2>Phone {} RAM 8GB ROM 256GB</h2><a href="/p/{}">{}</a></section>"#,
            i, i, details
        ));
    }
    body.push_str("</body></html>");
    mount_page(&mock_server, 1, body).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.end_page = Some(1);

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();
    assert_eq!(report.records_saved, 6);

    let records = store_for(&config).read_all().unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| !r.name.is_empty()));
    assert_eq!(records.iter().filter(|r| r.price.is_none()).count(), 3);

    let second = &records[1];
    assert_eq!(second.price, Some(2_499_000));
    assert_eq!(second.ram, Some(SpecNumber::Int(8)));
    assert_eq!(second.storage, Some(SpecNumber::Int(256)));
    assert_eq!(second.screen_size, Some(6.6));
    assert_eq!(second.battery, Some(5000));
    assert_eq!(second.release_year, Some(2024));
    assert_eq!(records[0].camera, Some(50));
}

#[tokio::test]
async fn test_unreachable_pages_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/smartphone"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    for page in ["2", "3"] {
        Mock::given(method("GET"))
            .and(path("/smartphone"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
    }
    mount_page(&mock_server, 4, panel_page(&[("Itel S24", "Rp 1.399.000")])).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.max_empty_pages = 2;
    config.crawl.end_page = Some(4);

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.pages_visited, 4);
    assert_eq!(report.pages_failed, 3);
    assert_eq!(report.records_saved, 1);
    assert_eq!(report.stop_reason, StopReason::EndPageReached(4));

    let records = store_for(&config).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Itel S24");
}

#[tokio::test]
async fn test_persist_failure_keeps_crawling() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, panel_page(&[("Honor X6b", "Rp 1.699.000")])).await;
    mount_page(&mock_server, 2, panel_page(&[("Honor X6b", "Rp 1.699.000")])).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.max_empty_pages = 1;
    config.crawl.end_page = Some(2);

    // An empty dataset is rewritten through `<file>.tmp`; a directory there
    // makes every write fail while backups of the dataset still succeed
    std::fs::write(&config.output.csv_path, "").unwrap();
    std::fs::create_dir(format!("{}.tmp", config.output.csv_path)).unwrap();

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_failed, 2);
    assert_eq!(report.pages_with_records, 0);
    assert_eq!(report.records_saved, 0);
    // The listing is released after the first failure and tried again on page 2
    assert_eq!(report.duplicates_skipped, 0);
    assert_eq!(report.stop_reason, StopReason::EndPageReached(2));

    // One snapshot at start, one after each failed page
    assert_eq!(backup_count(&config), 3);
    assert!(store_for(&config).read_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_backup_after_every_saved_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, panel_page(&[("Realme Note 50", "Rp 1.099.000")])).await;
    mount_page(&mock_server, 2, panel_page(&[("Realme C65", "Rp 1.899.000")])).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.backup_interval = 1;
    config.crawl.end_page = Some(2);
    std::fs::write(
        &config.output.csv_path,
        "Name,Price,RAM,Storage,Camera,ScreenSize,Battery,ReleaseYear\nNokia 105,299000,,,,,,\n",
    )
    .unwrap();

    let report = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.pages_with_records, 2);
    assert_eq!(report.records_saved, 2);
    // Initial snapshot plus one per saved page
    assert_eq!(backup_count(&config), 3);

    let names: Vec<String> = store_for(&config)
        .read_all()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Nokia 105", "Realme Note 50", "Realme C65"]);
}
