use crate::{create_test_config, html_page};
use arachne::Orchestrator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(
    server: &MockServer,
    route: &str,
    title: &str,
    next: Option<&str>,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(title, next)))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pagination_cycle_visits_two_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Seed", Some("/b"), 1).await;
    mount_page(&server, "/b", "Page B", Some("/"), 1).await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let seed = format!("{}/", server.uri());
    let results = orchestrator.scrape_site(&seed).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, seed);
    assert_eq!(results[0].title, "Seed");
    assert_eq!(
        results[0].next_url.as_deref(),
        Some(format!("{}/b", server.uri()).as_str())
    );
    assert_eq!(results[1].title, "Page B");
    assert_eq!(results[1].next_url.as_deref(), Some(seed.as_str()));
}

#[tokio::test]
async fn test_pagination_stops_at_max_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/page/1", "Page 1", Some("/page/2"), 1).await;
    mount_page(&server, "/page/2", "Page 2", Some("/page/3"), 1).await;
    mount_page(&server, "/page/3", "Page 3", Some("/page/4"), 1).await;
    mount_page(&server, "/page/4", "Page 4", Some("/page/5"), 0).await;

    let mut config = create_test_config();
    config.crawler.max_pages = 3;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let results = orchestrator
        .scrape_site(&format!("{}/page/1", server.uri()))
        .await;

    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Page 1", "Page 2", "Page 3"]);
}

#[tokio::test]
async fn test_pagination_ends_without_next_link() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "A", Some("/b"), 1).await;
    mount_page(&server, "/b", "B", None, 1).await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let results = orchestrator
        .scrape_site(&format!("{}/a", server.uri()))
        .await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(orchestrator.metrics_snapshot().successful_requests, 2);
}

#[tokio::test]
async fn test_pagination_stops_at_broken_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "A", Some("/gone"), 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(&create_test_config()).unwrap();
    let results = orchestrator
        .scrape_site(&format!("{}/a", server.uri()))
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_success());
    assert!(results[1].error.as_deref().unwrap().contains("410"));
}

#[tokio::test]
async fn test_pagination_deadline_ends_crawl() {
    let server = MockServer::start().await;
    for (route, next) in [("/1", "/2"), ("/2", "/3"), ("/3", "/4")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html_page(route, Some(next)))
                    .set_delay(std::time::Duration::from_millis(250)),
            )
            .mount(&server)
            .await;
    }

    let mut config = create_test_config();
    config.crawler.total_timeout_ms = 400;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let results = orchestrator
        .scrape_site(&format!("{}/1", server.uri()))
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_success());
    let error = results[1].error.as_deref().unwrap();
    assert!(
        error.contains("deadline exceeded") || error.contains("timed out"),
        "unexpected error: {}",
        error
    );
}
