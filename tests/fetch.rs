use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trino_release_diff::config::FetchConfig;
use trino_release_diff::fetch::{FetchError, HttpFetcher, ReleaseNoteFetcher};

fn config_for(base: &str, timeout_secs: u64) -> FetchConfig {
    FetchConfig {
        url_template: format!("{}/release/release-{{version}}.html", base),
        timeout_secs,
        user_agent: "trd-test".to_string(),
    }
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release/release-402.html"))
        .and(header("User-Agent", "trd-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Release 402</h1>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&mock_server.uri(), 10)).unwrap();
    let body = fetcher.fetch("402").await.unwrap();

    assert_eq!(body, "<h1>Release 402</h1>");
}

#[tokio::test]
async fn test_non_success_status_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release/release-999.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/release-500.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&mock_server.uri(), 10)).unwrap();

    assert_eq!(
        fetcher.fetch("999").await.unwrap_err(),
        FetchError::NotFound { status: 404 }
    );
    assert_eq!(
        fetcher.fetch("500").await.unwrap_err(),
        FetchError::NotFound { status: 503 }
    );
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release/release-402.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<h1>late</h1>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&mock_server.uri(), 1)).unwrap();

    assert_eq!(fetcher.fetch("402").await.unwrap_err(), FetchError::Timeout);
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Grab a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new(&config_for(&format!("http://{}", addr), 5)).unwrap();

    assert!(matches!(
        fetcher.fetch("402").await.unwrap_err(),
        FetchError::Network(_)
    ));
}
