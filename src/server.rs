//! HTTP service exposing the backtest importer.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness check with the service name |
//! | `POST` | `/v1/import/backtests` | Run the table importer |
//!
//! The import runs inline within the request-handling path; a long import
//! blocks that request. There is no job queue and no cancellation.
//!
//! # Error Contract
//!
//! Importer failures return a 500 with a structured body:
//!
//! ```json
//! { "error": { "code": "import_failed", "message": "..." } }
//! ```

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::import::import_sqlite_to_postgres;

/// Shared application state passed to route handlers via Axum's `State`.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Starts the HTTP server on `service.bind` and runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.service.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/v1/import/backtests", post(handle_import))
        .layer(cors)
        .with_state(state);

    println!("{} listening on http://{}", config.service.name, bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
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

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn import_failed(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "import_failed".to_string(),
        message: format!("{:#}", err),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.config.service.name.clone(),
    })
}

// ============ POST /v1/import/backtests ============

#[derive(Deserialize, Default)]
struct ImportRequest {
    /// Source database; defaults to `backtests.sqlite_path` from config.
    #[serde(default)]
    sqlite_path: Option<PathBuf>,
    /// Per-table row cap; absent or non-positive means unbounded.
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ImportResponse {
    ok: bool,
    imported_tables: Vec<String>,
    notes: Vec<String>,
}

async fn handle_import(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let sqlite_path = req
        .sqlite_path
        .unwrap_or_else(|| state.config.backtests.sqlite_path.clone());

    let imported = import_sqlite_to_postgres(&sqlite_path, &state.config.database.url, req.limit)
        .await
        .map_err(import_failed)?;

    Ok(Json(ImportResponse {
        ok: true,
        imported_tables: imported,
        notes: vec![
            "SQLite read-only".to_string(),
            "Market data untouched".to_string(),
        ],
    }))
}
