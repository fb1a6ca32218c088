//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a synthetic four-level archive and run
//! the full crawl cycle end-to-end into CSV files.

use journal_harvest::config::{AggregationMode, Config};
use journal_harvest::crawler::{Coordinator, Stage};
use journal_harvest::storage::CsvSink;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUE_PATH: &str = "/nature/journal/v581/n7808/index.html";
const SUPPLEMENT_PATH: &str = "/nature/journal/v581/n7808s/supp_index.html";
const ARTICLE_PATH: &str = "/nature/journal/v581/n7808/full/s41586.html";
const METRICS_PATH: &str = "/nature/journal/v581/n7808/metrics/s41586";

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, output: &TempDir) -> Config {
    let mut config = Config::with_lower_year_bound(2020);
    config.crawler.upper_year_bound = Some(2020);
    config.crawler.request_delay_seconds = 0.0;
    config.site.base_url = base_url.to_string();
    config.output.directory = output.path().to_path_buf();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Mounts index -> issue -> article -> metrics, plus a supplementary issue
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/nature/archive/"))
        .respond_with(html(format!(
            r#"<html><body><ul>
                <li>2020
                  <ul>
                    <li><a href="{}">Issue 7808</a></li>
                    <li><a href="{}">Supplement</a></li>
                  </ul>
                </li>
            </ul></body></html>"#,
            ISSUE_PATH, SUPPLEMENT_PATH
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(SUPPLEMENT_PATH))
        .respond_with(html("<html></html>".to_string()))
        .expect(0)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(ISSUE_PATH))
        .respond_with(html(format!(
            r#"<html><body><div id="lt">
                <hgroup><h1><a href="{}">A letter</a></h1></hgroup>
            </div></body></html>"#,
            ARTICLE_PATH
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .respond_with(html(format!(
            r#"<html><body><ul>
                <li class="article-metrics"><a href="{}">Metrics</a></li>
            </ul></body></html>"#,
            METRICS_PATH
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(METRICS_PATH))
        .respond_with(html(
            r#"<html><head>
                <meta name="DC.title" content="Foo: Bar's Study (2021)!">
                <meta name="DC.date" content="2020-05-07">
                <meta name="prism.volume" content="581">
                <meta name="prism.issue" content="7808">
            </head><body>
                <div class="citation-count">Citations: 3</div>
                <div class="citation-count">Web of Science 12</div>
                <img alt="altmetric-donut" src="https://badges.example.com/?score=45&amp;types=t">
                <span class="total">1,000</span>
            </body></html>"#
                .to_string(),
        ))
        .mount(server)
        .await;
}

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read output file")
}

#[tokio::test]
async fn test_full_harvest_single_article() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().expect("Failed to create temp dir");

    let config = create_test_config(&server.uri(), &output);
    let sink = CsvSink::from_config(&config.output, 2020);
    sink.init_dataset().expect("Failed to init dataset");

    let coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Harvest failed");

    assert_eq!(stats.records_written, 1);
    assert_eq!(stats.total_failed(), 0);
    assert_eq!(stats.stage(Stage::Issue).dispatched, 1);

    let dataset = read(&output.path().join("nature_data_2020.csv"));
    let lines: Vec<&str> = dataset.lines().collect();
    assert_eq!(lines.len(), 2, "header plus one record, got: {}", dataset);
    assert!(lines[0].starts_with("\"article_title\""));
    assert_eq!(
        lines[1],
        "\"Foo  Bar s Study  2021  \",\"581\",\"7808\",\"2020-05-07\",\"3\",\"45\",\"0\",\"1000\""
    );
}

#[tokio::test]
async fn test_audit_files_record_discovered_links() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().expect("Failed to create temp dir");

    let config = create_test_config(&server.uri(), &output);
    let sink = CsvSink::from_config(&config.output, 2020);
    let coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");
    coordinator.run().await.expect("Harvest failed");

    let issues = read(&output.path().join("issue_urls_2020.csv"));
    assert_eq!(
        issues,
        format!("\"{}\",\"{}\"\n", ISSUE_PATH, SUPPLEMENT_PATH),
        "supplementary links are audited even though they are not followed"
    );

    let articles = read(&output.path().join("article_urls_2020.csv"));
    assert_eq!(articles, format!("\"{}\"\n", ARTICLE_PATH));

    let metrics = read(&output.path().join("metric_urls_2020.csv"));
    assert_eq!(metrics, format!("\"{}\"\n", METRICS_PATH));
}

#[tokio::test]
async fn test_numeric_aggregation_mode() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().expect("Failed to create temp dir");

    let mut config = create_test_config(&server.uri(), &output);
    config.crawler.aggregation = AggregationMode::Numeric;
    let sink = CsvSink::from_config(&config.output, 2020);
    let coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");
    coordinator.run().await.expect("Harvest failed");

    let dataset = read(&output.path().join("nature_data_2020.csv"));
    let row = dataset.lines().next().expect("Expected one record");
    assert!(
        row.contains(",\"12\",\"45\","),
        "numeric max of 3 and 12 should be 12, got: {}",
        row
    );
}

#[tokio::test]
async fn test_dataset_grows_across_runs() {
    let output = TempDir::new().expect("Failed to create temp dir");

    for _ in 0..2 {
        let server = MockServer::start().await;
        mount_site(&server).await;

        let config = create_test_config(&server.uri(), &output);
        let sink = CsvSink::from_config(&config.output, 2020);
        sink.ensure_dataset().expect("Failed to ensure dataset");

        let coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");
        coordinator.run().await.expect("Harvest failed");
    }

    let dataset = read(&output.path().join("nature_data_2020.csv"));
    assert_eq!(dataset.lines().count(), 3, "one header and two records");

    // The index audit is overwritten per run; the others append
    let issues = read(&output.path().join("issue_urls_2020.csv"));
    assert_eq!(issues.lines().count(), 1);
    let articles = read(&output.path().join("article_urls_2020.csv"));
    assert_eq!(articles.lines().count(), 2);
}

#[tokio::test]
async fn test_request_delay_throttles_dispatch() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().expect("Failed to create temp dir");

    let mut config = create_test_config(&server.uri(), &output);
    config.crawler.request_delay_seconds = 0.1;
    let sink = CsvSink::from_config(&config.output, 2020);
    let coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");

    let start = Instant::now();
    coordinator.run().await.expect("Harvest failed");

    // Four requests, three gaps
    assert!(
        start.elapsed() >= Duration::from_millis(300),
        "expected at least 300ms, took {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_server_error_on_index_ends_run_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nature/archive/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let output = TempDir::new().expect("Failed to create temp dir");

    let config = create_test_config(&server.uri(), &output);
    let sink = CsvSink::from_config(&config.output, 2020);
    let coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Run should finish despite failures");

    assert_eq!(stats.records_written, 0);
    assert_eq!(stats.stage(Stage::Index).fetch_failures, 1);
    assert!(!output.path().join("issue_urls_2020.csv").exists());
}
