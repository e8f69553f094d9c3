//! Integration tests for the harvester
//!
//! These tests use wiremock to serve sitemap trees and pages, and drive the
//! resolver, the dispatcher and complete runs end-to-end.

use async_trait::async_trait;
use sitemap_harvester::config::Config;
use sitemap_harvester::crawler::{
    run_distributed, FetchResult, Fetcher, Harvester, HttpFetcher, MemoryFetcher, RunShape,
    SitemapResolver, TaskContext, TaskDispatcher, Worker,
};
use sitemap_harvester::extract::{ExtractMode, ExtractionEngine, EMAIL_PATTERN};
use sitemap_harvester::output::MemorySink;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.harvest.echo_matches = false;
    config.fetcher.timeout_secs = 5;
    config.fetcher.connect_timeout_secs = 2;
    config.output.urls_path = dir.join("urls.txt").to_string_lossy().into_owned();
    config.output.output_dir = dir.to_string_lossy().into_owned();
    config
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves a two-level sitemap with three contact pages
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    mount_page(
        server,
        "/sitemap.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{base}/sitemap-pages.xml</loc></sitemap>
  <url><loc>
    {base}/contact
  </loc></url>
</sitemapindex>"#
        ),
    )
    .await;

    mount_page(
        server,
        "/sitemap-pages.xml",
        format!(
            "<urlset><url><loc>{base}/team</loc></url><url><loc>{base}/about</loc></url></urlset>"
        ),
    )
    .await;

    mount_page(
        server,
        "/contact",
        "<p>Write to info@example.com or sales@example.org</p>".to_string(),
    )
    .await;
    mount_page(
        server,
        "/team",
        "<ul><li>ana@example.com</li><li>(612) 555-0100</li></ul>".to_string(),
    )
    .await;
    mount_page(server, "/about", "<p>No contact details here.</p>".to_string()).await;
}

/// Wraps a fetcher and sleeps before every fetch
struct DelayedFetcher {
    inner: Arc<dyn Fetcher>,
    delay: Duration,
}

#[async_trait]
impl Fetcher for DelayedFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(url).await
    }
}

#[tokio::test]
async fn test_resolver_over_http_is_pre_order() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let fetcher = Arc::new(HttpFetcher::new(&Config::default().fetcher).unwrap());
    let resolver = SitemapResolver::new(fetcher, ".xml").unwrap();

    let (leaves, stats) = resolver
        .resolve_with_stats(&format!("{}/sitemap.xml", base))
        .await;

    assert_eq!(
        leaves,
        vec![
            format!("{}/team", base),
            format!("{}/about", base),
            format!("{}/contact", base),
        ]
    );
    assert_eq!(stats.sitemaps_fetched, 2);
    assert_eq!(stats.sitemaps_failed, 0);
}

#[tokio::test]
async fn test_resolver_fetches_cyclic_sitemaps_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/a.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<loc>{base}/b.xml</loc><loc>{base}/page-a</loc>"
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<loc>{base}/a.xml</loc><loc>{base}/page-b</loc>"
        )))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&Config::default().fetcher).unwrap());
    let resolver = SitemapResolver::new(fetcher, ".xml").unwrap();
    let leaves = resolver.resolve(&format!("{}/a.xml", base)).await;

    assert_eq!(
        leaves,
        vec![format!("{}/page-b", base), format!("{}/page-a", base)]
    );
    // Wiremock verifies the `expect(1)` counts when the server drops
}

#[tokio::test]
async fn test_full_sequential_run() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();
    let dir = tempdir().unwrap();

    let harvester = Harvester::new(create_test_config(dir.path())).unwrap();
    let report = harvester
        .run(
            &format!("{}/sitemap.xml", base),
            ExtractMode::Email,
            RunShape::Sequential,
        )
        .await
        .expect("Harvest failed");

    assert_eq!(report.urls_discovered, 3);
    assert_eq!(report.tasks_completed, 3);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.matches_written, 3);
    assert_eq!(report.results_path, dir.path().join("emails.txt"));

    let urls = std::fs::read_to_string(dir.path().join("urls.txt")).unwrap();
    assert_eq!(
        urls,
        format!("{base}/team\n{base}/about\n{base}/contact\n")
    );

    let emails = std::fs::read_to_string(dir.path().join("emails.txt")).unwrap();
    assert_eq!(
        emails,
        "ana@example.com\ninfo@example.com\nsales@example.org\n"
    );
}

#[tokio::test]
async fn test_full_distributed_run_truncates_previous_results() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("phones.txt"), "left over from last run\n").unwrap();

    let harvester = Harvester::new(create_test_config(dir.path())).unwrap();
    let report = harvester
        .run(
            &format!("{}/sitemap.xml", server.uri()),
            ExtractMode::Phone,
            RunShape::Distributed { workers: 4 },
        )
        .await
        .expect("Harvest failed");

    assert_eq!(report.tasks_completed, 3);
    assert_eq!(report.matches_written, 1);

    let phones = std::fs::read_to_string(dir.path().join("phones.txt")).unwrap();
    assert_eq!(phones, "(612) 555-0100\n");
}

#[tokio::test]
async fn test_fetch_failure_skips_only_that_url() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/one", "one@example.com".to_string()).await;
    mount_page(&server, "/three", "three@example.com".to_string()).await;

    let sink = Arc::new(MemorySink::new());
    let context = TaskContext {
        fetcher: Arc::new(HttpFetcher::new(&Config::default().fetcher).unwrap()),
        engine: Arc::new(ExtractionEngine::new(EMAIL_PATTERN, 255).unwrap()),
        sink: sink.clone(),
    };

    let urls = vec![
        format!("{}/one", base),
        "http://127.0.0.1:1/unreachable".to_string(),
        format!("{}/three", base),
    ];
    let (dispatch, reports) = run_distributed(context, urls, 2).await;

    assert_eq!(dispatch.tasks_assigned, 3);
    assert_eq!(sink.groups().len(), 2);

    let mut lines = sink.lines();
    lines.sort();
    assert_eq!(lines, vec!["one@example.com", "three@example.com"]);

    let failures: usize = reports.iter().map(|r| r.fetch_failures).sum();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn test_empty_sitemap_stops_every_worker() {
    let server = MockServer::start().await;
    mount_page(&server, "/sitemap.xml", "<urlset></urlset>".to_string()).await;
    let dir = tempdir().unwrap();

    let harvester = Harvester::new(create_test_config(dir.path())).unwrap();
    let report = harvester
        .run(
            &format!("{}/sitemap.xml", server.uri()),
            ExtractMode::Email,
            RunShape::Distributed { workers: 3 },
        )
        .await
        .unwrap();

    assert_eq!(report.urls_discovered, 0);
    assert_eq!(report.tasks_completed, 0);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("emails.txt")).unwrap(),
        ""
    );

    let context = TaskContext {
        fetcher: Arc::new(MemoryFetcher::new()),
        engine: Arc::new(ExtractionEngine::new(EMAIL_PATTERN, 255).unwrap()),
        sink: Arc::new(MemorySink::new()),
    };
    let (dispatch, reports) = run_distributed(context, Vec::new(), 3).await;
    assert_eq!(dispatch.tasks_assigned, 0);
    assert_eq!(dispatch.stops_sent, 3);
    assert_eq!(reports.len(), 3);
}

#[tokio::test]
async fn test_assignments_match_queue_for_any_pool_size() {
    for workers in [1usize, 2, 5, 12] {
        for queue in [0usize, 1, 7, 40] {
            let urls: Vec<String> = (0..queue).map(|i| format!("https://ex.com/{}", i)).collect();
            let mut fetcher = MemoryFetcher::new();
            for url in &urls {
                fetcher.insert(url, "x@example.com");
            }
            let sink = Arc::new(MemorySink::new());
            let context = TaskContext {
                fetcher: Arc::new(fetcher),
                engine: Arc::new(ExtractionEngine::new(EMAIL_PATTERN, 255).unwrap()),
                sink: sink.clone(),
            };

            let (dispatch, _) = run_distributed(context, urls, workers).await;

            assert_eq!(dispatch.tasks_assigned, queue, "workers={} queue={}", workers, queue);
            assert_eq!(dispatch.stops_sent, workers, "workers={} queue={}", workers, queue);
            assert_eq!(sink.groups().len(), queue);
        }
    }
}

#[tokio::test]
async fn test_slow_worker_receives_fewer_tasks() {
    let urls: Vec<String> = (0..20).map(|i| format!("https://ex.com/page/{}", i)).collect();
    let mut pages = MemoryFetcher::new();
    for url in &urls {
        pages.insert(url, "hello@example.com");
    }
    let pages: Arc<dyn Fetcher> = Arc::new(pages);

    let engine = Arc::new(ExtractionEngine::new(EMAIL_PATTERN, 255).unwrap());
    let sink = Arc::new(MemorySink::new());

    let mut dispatcher = TaskDispatcher::new(urls);
    let fast_channel = dispatcher.register_worker();
    let slow_channel = dispatcher.register_worker();
    let fast_id = fast_channel.worker_id;
    let slow_id = slow_channel.worker_id;

    let fast = Worker::new(
        fast_channel,
        TaskContext {
            fetcher: Arc::new(DelayedFetcher {
                inner: pages.clone(),
                delay: Duration::from_millis(1),
            }),
            engine: engine.clone(),
            sink: sink.clone(),
        },
    );
    let slow = Worker::new(
        slow_channel,
        TaskContext {
            fetcher: Arc::new(DelayedFetcher {
                inner: pages.clone(),
                delay: Duration::from_millis(150),
            }),
            engine,
            sink: sink.clone(),
        },
    );

    let fast_handle = tokio::spawn(fast.run());
    let slow_handle = tokio::spawn(slow.run());
    let dispatch = dispatcher.run().await;
    let fast_report = fast_handle.await.unwrap();
    let slow_report = slow_handle.await.unwrap();

    assert_eq!(dispatch.tasks_assigned, 20);
    assert!(
        dispatch.assigned_to(fast_id) > dispatch.assigned_to(slow_id),
        "fast worker got {} tasks, slow worker got {}",
        dispatch.assigned_to(fast_id),
        dispatch.assigned_to(slow_id)
    );
    assert_eq!(
        fast_report.tasks_completed + slow_report.tasks_completed,
        20
    );
    assert_eq!(sink.lines().len(), 20);
}
