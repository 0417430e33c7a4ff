use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trino_release_diff::compare::ComparisonService;
use trino_release_diff::config::Config;
use trino_release_diff::server::{router, AppState};
use trino_release_diff::sqlite_store::SqliteStore;
use trino_release_diff::{db, migrate};

struct TestServer {
    base: String,
    _tmp: TempDir,
    _notes: MockServer,
}

async fn mount_page(notes: &MockServer, version: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/release-{}.html", version)))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(notes)
        .await;
}

async fn start() -> TestServer {
    let notes = MockServer::start().await;
    mount_page(
        &notes,
        "402",
        "<h2>Breaking changes</h2><ul><li>Removed the Accumulo connector</li></ul>",
    )
    .await;
    mount_page(
        &notes,
        "403",
        "<h2>New features</h2><ul><li>Improved SQL Server JDBC driver</li></ul>",
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let mut config = Config::with_db_path(tmp.path().join("trd.sqlite"));
    config.fetch.url_template = format!("{}/release-{{version}}.html", notes.uri());

    let pool = db::connect(&config).await.unwrap();
    migrate::migrate_pool(&pool).await.unwrap();
    migrate::seed_versions(&pool).await.unwrap();
    let store = Arc::new(SqliteStore::new(pool));
    let service = ComparisonService::from_config(&config, store).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(Arc::new(service)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        _tmp: tmp,
        _notes: notes,
    }
}

#[tokio::test]
async fn test_health() {
    let server = start().await;
    let body: Value = reqwest::get(format!("{}/health", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_versions_newest_first() {
    let server = start().await;
    let body: Value = reqwest::get(format!("{}/api/versions", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let versions = body["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 12);
    assert_eq!(versions[0], "474");
    assert_eq!(versions[11], "401");
}

#[tokio::test]
async fn test_compare_requires_both_versions() {
    let server = start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/compare_versions", server.base))
        .json(&json!({ "from_version": "401" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(
        body["error"]["message"],
        "Both from_version and to_version are required"
    );
}

#[tokio::test]
async fn test_compare_unreadable_body_is_bad_request() {
    let server = start().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/compare_versions", server.base);

    let bodies = [
        ("application/json", "{\"from_version\": "),
        ("application/x-www-form-urlencoded", "from_version=401&to_version=403"),
    ];
    for (content_type, body) in bodies {
        let resp = client
            .post(&url)
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400, "content-type {}", content_type);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn test_compare_non_numeric_is_bad_request() {
    let server = start().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/compare_versions", server.base))
        .json(&json!({ "from_version": "401", "to_version": "latest" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_compare_then_connector_lookup() {
    let server = start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/compare_versions", server.base))
        .json(&json!({ "from_version": "403", "to_version": "401" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["from_version"], "403");
    assert_eq!(body["to_version"], "401");
    assert_eq!(body["changes"]["breaking_changes"][0]["version"], "402");
    assert_eq!(
        body["changes"]["new_features"][0]["items"][0],
        "Improved SQL Server JDBC driver"
    );
    assert_eq!(
        body["connectors"]["Accumulo"]["breaking_changes"][0]["version"],
        "402"
    );
    assert_eq!(
        body["connectors"]["SQL Server"]["new_features"][0]["version"],
        "403"
    );

    let names: Value = reqwest::get(format!("{}/api/connectors", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names["connectors"], json!(["Accumulo", "SQL Server"]));

    let accumulo: Value = reqwest::get(format!("{}/api/connector_changes/Accumulo", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accumulo["connector"], "Accumulo");
    assert_eq!(accumulo["breaking_changes"][0]["impact"], "high");
    assert_eq!(accumulo["features"], json!([]));
}

#[tokio::test]
async fn test_unknown_connector_is_empty() {
    let server = start().await;
    let body: Value = reqwest::get(format!("{}/api/connector_changes/Nothing", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["connector"], "Nothing");
    assert_eq!(body["breaking_changes"], json!([]));
    assert_eq!(body["features"], json!([]));
}
