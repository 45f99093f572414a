//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! seed -> fetch -> parse -> enqueue cycle end-to-end.

use ripple_crawl::config::{Config, CrawlerConfig, SinkConfig};
use ripple_crawl::crawler::{crawl, Coordinator};
use ripple_crawl::output::StopReason;
use ripple_crawl::sink::{MemorySink, Sink};
use ripple_crawl::CrawlError;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded with the given URL
fn create_test_config(seed: String, max_pages: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            seeds: vec![seed],
            max_pages,
            fetch_concurrency: 1,
            parse_workers: 4,
            stats_interval_secs: 60,
            snippet_cap: 500,
            fetch_timeout_secs: Some(5),
        },
        ..Config::default()
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(title, body))
        .expect(1)
        .mount(server)
        .await;
}

fn connected_memory_sink() -> Arc<MemorySink> {
    let sink = Arc::new(MemorySink::new());
    sink.connect().expect("memory sink connects");
    sink
}

#[tokio::test]
async fn test_full_crawl_exhausts_frontier() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        "Home",
        &format!(
            r#"<p>Welcome</p>
            <a href="{base}/page1">Page 1</a>
            <a href="{base}/page2">Page 2</a>
            <a href="/relative">Relative</a>
            <a href="">Empty</a>"#
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        "Page 1",
        &format!(r#"Content 1 <a href="{base}/">Home</a> <a href="{base}/page2">Two</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/page2",
        "Page 2",
        &format!(r#"Content 2 <a href="{base}/page1">One</a>"#),
    )
    .await;

    let sink = connected_memory_sink();
    let config = create_test_config(format!("{}/", base), 100);
    let report = Coordinator::new(config, sink.clone())
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.visited, 3);
    assert_eq!(report.total_enqueued, 3);
    assert_eq!(report.frontier_remaining, 0);
    assert_eq!(report.pages_recorded, 3);
    assert_eq!(report.fetch_failures, 0);

    let records = sink.records();
    assert_eq!(records.len(), 3);

    // Breadth-first: the seed is always first
    assert_eq!(records[0].url, format!("{}/", base));
    assert_eq!(records[0].title, "Home");
    assert_eq!(records[0].content, "Welcome");

    let page1 = records
        .iter()
        .find(|r| r.url.ends_with("/page1"))
        .expect("page1 recorded");
    assert_eq!(page1.title, "Page 1");
    assert_eq!(page1.content, "Content 1");

    assert!(!sink.is_connected());
    assert_eq!(sink.disconnect_count(), 1);
}

#[tokio::test]
async fn test_crawl_stops_at_page_cap() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="{base}/p{i}">P{i}</a>"#))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Hub", &links))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page("Leaf", "leaf"))
        .mount(&server)
        .await;

    let sink = connected_memory_sink();
    let config = create_test_config(format!("{}/", base), 3);
    let report = Coordinator::new(config, sink.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::CapReached);
    assert_eq!(report.visited, 3);
    assert_eq!(report.total_enqueued, 11);
    assert_eq!(report.frontier_remaining, 8);
    assert_eq!(sink.len(), 3);
}

#[tokio::test]
async fn test_fetch_failures_are_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        "Home",
        &format!(
            r#"<a href="{base}/missing">Missing</a>
            <a href="{base}/broken">Broken</a>
            <a href="{base}/ok">Ok</a>"#
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "Ok", "fine").await;

    let sink = connected_memory_sink();
    let config = create_test_config(format!("{}/", base), 100);
    let report = Coordinator::new(config, sink.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.visited, 4);
    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.pages_recorded, 2);

    let titles: Vec<String> = sink.records().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Home".to_string(), "Ok".to_string()]);
}

#[tokio::test]
async fn test_empty_body_is_not_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        "Home",
        &format!(r#"<a href="{base}/empty">Empty</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink = connected_memory_sink();
    let report = Coordinator::new(create_test_config(format!("{}/", base), 100), sink.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_concurrent_fetches_visit_each_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages = 12;

    // Every page links to every other page, so each URL is discovered many times
    let all_links: String = (0..pages)
        .map(|i| format!(r#"<a href="{base}/n{i}">N{i}</a>"#))
        .collect();

    mount_page(&server, "/", "Root", &all_links).await;
    for i in 0..pages {
        mount_page(&server, &format!("/n{}", i), &format!("N{}", i), &all_links).await;
    }

    let mut config = create_test_config(format!("{}/", base), 1000);
    config.crawler.fetch_concurrency = 4;

    let sink = connected_memory_sink();
    let report = Coordinator::new(config, sink.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.visited, pages + 1);
    assert_eq!(report.total_enqueued, pages + 1);
    assert_eq!(sink.len(), pages + 1);

    let mut urls: Vec<String> = sink.records().into_iter().map(|r| r.url).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), pages + 1);

    // Dropping the server verifies every `.expect(1)`
}

#[tokio::test]
async fn test_crawl_with_sqlite_sink() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        "Home",
        &format!(r#"Hello <a href="{base}/about">About</a>"#),
    )
    .await;
    mount_page(&server, "/about", "About", "About us").await;

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("pages.db");

    // Leftovers from an earlier run must be wiped on connect
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pages (id INTEGER PRIMARY KEY AUTOINCREMENT, url TEXT NOT NULL,
             title TEXT NOT NULL, content TEXT NOT NULL, crawled_at TEXT NOT NULL);
             INSERT INTO pages (url, title, content, crawled_at)
             VALUES ('https://stale.example/', 'Stale', '', 'then');",
        )
        .unwrap();
    }

    let mut config = create_test_config(format!("{}/", base), 100);
    config.sink = SinkConfig {
        database_path: Some(db_path.display().to_string()),
        required: true,
    };

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.visited, 2);
    assert_eq!(report.pages_recorded, 2);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT title, content FROM pages ORDER BY id")
        .unwrap();
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        rows,
        vec![
            ("Home".to_string(), "Hello".to_string()),
            ("About".to_string(), "About us".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_required_sink_failure_aborts_crawl() {
    let mut config = create_test_config("http://127.0.0.1:9/".to_string(), 10);
    config.sink = SinkConfig {
        database_path: Some("/nonexistent-dir/deeper/pages.db".to_string()),
        required: true,
    };

    assert!(crawl(config).await.is_err());
}

#[tokio::test]
async fn test_optional_sink_failure_still_crawls() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", "Hi").await;

    let mut config = create_test_config(format!("{}/", server.uri()), 10);
    config.sink = SinkConfig {
        database_path: Some("/nonexistent-dir/deeper/pages.db".to_string()),
        required: false,
    };

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.visited, 1);
    assert_eq!(report.pages_recorded, 0);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_crawling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("Home", "Hi"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(format!("{}/", server.uri()), 10);
    config.crawler.fetch_concurrency = 0;

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), crawl(config))
        .await
        .expect("invalid config must fail fast");
    assert!(matches!(result, Err(CrawlError::Config(_))));
}
