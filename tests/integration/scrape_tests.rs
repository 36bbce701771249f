use crate::{create_test_config, html_page};
use arachne::crawler::CircuitState;
use arachne::output::{write_report, ScrapeReport};
use arachne::{domain_of, Orchestrator};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_page(server: &MockServer, route: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(title, None))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bulk_scrape_across_servers() {
    // Each server has its own port and therefore its own domain key
    let mut servers = Vec::new();
    for i in 0..5 {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html_page(&format!("Site {}", i), None))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;
        servers.push(server);
    }

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let urls: Vec<String> = servers.iter().map(|s| format!("{}/", s.uri())).collect();
    let results = orchestrator.scrape_urls(urls.clone()).await;

    assert_eq!(results.len(), 5);
    for result in &results {
        assert!(result.is_success(), "unexpected error: {:?}", result.error);
        assert_eq!(result.status, 200);
        assert!(result.title.starts_with("Site "));
        assert!(urls.contains(&result.url));
    }

    let snapshot = orchestrator.metrics_snapshot();
    assert_eq!(snapshot.total_requests, 5);
    assert_eq!(snapshot.successful_requests, 5);
    assert_eq!(snapshot.domains.len(), 5);
    assert!(snapshot.finished_at.is_some());
}

#[tokio::test]
async fn test_invalid_urls_in_batch() {
    let server = MockServer::start().await;
    serve_page(&server, "/ok", "Fine").await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let results = orchestrator
        .scrape_urls(vec![
            format!("{}/ok", server.uri()),
            "not a url".to_string(),
            "mailto:someone@example.com".to_string(),
        ])
        .await;

    assert_eq!(results.len(), 3);
    let failed: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
    assert_eq!(failed.len(), 2);
    for result in failed {
        assert_eq!(result.status, 0);
        assert!(result.content.is_empty());
        assert!(result.error.as_deref().unwrap().starts_with("invalid URL"));
    }
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let results = orchestrator
        .scrape_urls(vec![format!("{}/missing", server.uri())])
        .await;

    assert_eq!(
        results[0].error.as_deref().unwrap(),
        format!("HTTP 404 for {}/missing", server.uri())
    );
    let snapshot = orchestrator.metrics_snapshot();
    assert_eq!(snapshot.failed_requests, 1);
    assert_eq!(snapshot.retries, 0);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    serve_page(&server, "/flaky", "Recovered").await;

    let mut config = create_test_config();
    config.crawler.circuit_breaker_threshold = 5;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let results = orchestrator
        .scrape_urls(vec![format!("{}/flaky", server.uri())])
        .await;

    assert!(results[0].is_success());
    assert_eq!(results[0].title, "Recovered");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(orchestrator.metrics_snapshot().retries, 2);
}

#[tokio::test]
async fn test_failing_domain_opens_circuit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.retry_attempts = 5;
    let orchestrator = Orchestrator::new(&config).unwrap();

    let first = orchestrator
        .scrape_urls(vec![format!("{}/a", server.uri())])
        .await;
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(first[0]
        .error
        .as_deref()
        .unwrap()
        .contains("circuit breaker open"));

    // Further calls are rejected without reaching the server
    let second = orchestrator
        .scrape_urls(vec![
            format!("{}/b", server.uri()),
            format!("{}/c", server.uri()),
        ])
        .await;
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(second.iter().all(|r| !r.is_success()));

    let domain = domain_of(&server.uri());
    let stats = orchestrator.circuit_breaker_stats();
    assert_eq!(stats[&domain].state, CircuitState::Open);
    assert_eq!(stats[&domain].failures, 3);
}

#[tokio::test]
async fn test_content_truncated_to_cap() {
    let server = MockServer::start().await;
    let body = "a".repeat(1_000);
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_content_bytes = 100;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let results = orchestrator
        .scrape_urls(vec![format!("{}/big", server.uri())])
        .await;

    assert_eq!(results[0].content.len(), 100);
    assert_eq!(results[0].size, 1_000);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.request_timeout_ms = 100;
    config.crawler.retry_attempts = 1;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let results = orchestrator
        .scrape_urls(vec![format!("{}/slow", server.uri())])
        .await;

    assert!(results[0].error.as_deref().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_report_written_after_run() {
    let server = MockServer::start().await;
    serve_page(&server, "/", "Home").await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let results = orchestrator
        .scrape_urls(vec![format!("{}/", server.uri()), "bogus".to_string()])
        .await;
    let report = ScrapeReport::collect(results, &orchestrator, true);
    assert_eq!(report.failures(), 1);

    let dir = tempfile::TempDir::new().unwrap();
    let report_path = dir.path().join("scraping_results.json");
    write_report(&report_path, &report).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["results"].as_array().unwrap().len(), 2);
    assert_eq!(value["metrics"]["total_requests"], 1);
    assert_eq!(value["metrics"]["successful_requests"], 1);
    assert_eq!(
        value["circuit_breakers"][domain_of(&server.uri())]["state"],
        "closed"
    );
}

#[tokio::test]
async fn test_batch_deadline_returns_every_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Slow", None))
                .set_delay(Duration::from_millis(250)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_concurrent = 1;
    config.crawler.total_timeout_ms = 400;
    let orchestrator = Orchestrator::new(&config).unwrap();

    let urls: Vec<String> = (1..=3).map(|i| format!("{}/{}", server.uri(), i)).collect();
    let results = orchestrator.scrape_urls(urls).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().filter(|r| r.is_success()).count(), 1);
    for result in results.iter().filter(|r| !r.is_success()) {
        let error = result.error.as_deref().unwrap();
        assert!(
            error.contains("deadline exceeded") || error.contains("timed out"),
            "unexpected error: {}",
            error
        );
    }
}

#[tokio::test]
async fn test_redirect_loop_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/loop", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let results = orchestrator
        .scrape_urls(vec![format!("{}/loop", server.uri())])
        .await;

    assert!(results[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("permanent failure"));
    assert_eq!(orchestrator.metrics_snapshot().retries, 0);
}
