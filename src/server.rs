//! JSON HTTP API.
//!
//! Exposes comparisons and connector lookups to the web front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/versions` | Known versions, newest first |
//! | `GET`  | `/api/connectors` | Connector names with recorded changes |
//! | `POST` | `/api/compare_versions` | Compare two versions |
//! | `GET`  | `/api/connector_changes/{name}` | Stored changes for one connector |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Both from_version and to_version are required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500).

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use trino_release_diff_core::models::{ComparisonResult, ConnectorChanges};
use trino_release_diff_core::version::sort_newest_first;

use crate::compare::{CompareError, ComparisonService};
use crate::config::Config;
use crate::connectors::{self, ConnectorBuckets};
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ComparisonService>,
}

impl AppState {
    pub fn new(service: Arc<ComparisonService>) -> Self {
        Self { service }
    }
}

/// Starts the HTTP server on `[server].bind`. Runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let service = ComparisonService::from_config(config, store)?;
    let app = router(AppState::new(Arc::new(service)));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/versions", get(handle_versions))
        .route("/api/connectors", get(handle_connectors))
        .route("/api/compare_versions", post(handle_compare))
        .route("/api/connector_changes/{name}", get(handle_connector_changes))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "request failed");
        internal(err.to_string())
    }
}

impl From<CompareError> for AppError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::InvalidInput(message) => bad_request(message),
            other => {
                error!(error = %other, "comparison failed");
                internal(format!("Error comparing versions: {}", other))
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ GET /api/versions ============

#[derive(Serialize)]
struct VersionsResponse {
    versions: Vec<String>,
}

async fn handle_versions(
    State(state): State<AppState>,
) -> Result<Json<VersionsResponse>, AppError> {
    let mut versions = state.service.store().list_versions().await?;
    sort_newest_first(&mut versions);
    Ok(Json(VersionsResponse { versions }))
}

// ============ GET /api/connectors ============

#[derive(Serialize)]
struct ConnectorsResponse {
    connectors: Vec<String>,
}

async fn handle_connectors(
    State(state): State<AppState>,
) -> Result<Json<ConnectorsResponse>, AppError> {
    let connectors = state.service.store().connector_names().await?;
    Ok(Json(ConnectorsResponse { connectors }))
}

// ============ POST /api/compare_versions ============

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub from_version: String,
    #[serde(default)]
    pub to_version: String,
}

#[derive(Serialize)]
struct CompareResponse {
    from_version: String,
    to_version: String,
    changes: ComparisonResult,
    connectors: BTreeMap<String, ConnectorBuckets>,
}

/// Runs a comparison, then records the classified connector changes before
/// responding. The response echoes the versions as requested. Bodies that
/// are not JSON objects are rejected with the usual error contract.
async fn handle_compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<CompareResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| bad_request(format!("Invalid request body: {}", e.body_text())))?;
    if request.from_version.trim().is_empty() || request.to_version.trim().is_empty() {
        return Err(bad_request("Both from_version and to_version are required"));
    }

    let changes = state
        .service
        .compare(&request.from_version, &request.to_version)
        .await?;

    connectors::record_connector_changes(state.service.store().as_ref(), &changes).await;
    let by_connector = connectors::group_by_connector(&changes);

    Ok(Json(CompareResponse {
        from_version: request.from_version,
        to_version: request.to_version,
        changes,
        connectors: by_connector,
    }))
}

// ============ GET /api/connector_changes/{name} ============

async fn handle_connector_changes(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ConnectorChanges>, AppError> {
    let changes = connectors::lookup_by_connector(state.service.store().as_ref(), &name).await?;
    Ok(Json(changes))
}
