//! # Health Check Handlers
//!
//! Kubernetes-compatible probes plus the service index at `/`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::{debug, warn};

use crate::database;
use crate::web::response_types::{HealthResponse, ReadyResponse, RootResponse, STATUS_HEALTHY};
use crate::web::routes::SWAGGER_UI_PATH;
use crate::web::state::AppState;

/// Service index: GET /
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service index", body = RootResponse)
    ),
    tag = "health"
)]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} v{}", state.settings.app.name, state.settings.app.version),
        docs: SWAGGER_UI_PATH.to_string(),
        health: "/health".to_string(),
        ready: "/ready".to_string(),
    })
}

/// Basic health check endpoint: GET /health
///
/// Answers without touching the database.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_HEALTHY.to_string(),
        version: state.settings.app.version.clone(),
        timestamp: Utc::now(),
    })
}

/// Kubernetes readiness probe: GET /ready
///
/// One `SELECT 1` through the pool; both outcomes share the body shape.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Database reachable", body = ReadyResponse),
        (status = 503, description = "Database unreachable", body = ReadyResponse)
    ),
    tag = "health"
)]
pub async fn readiness_probe(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    debug!("Performing readiness probe");

    match database::health_check(&state.db_pool).await {
        Ok(true) => (StatusCode::OK, Json(ReadyResponse::ready())),
        Ok(false) => {
            warn!("Readiness probe returned an unexpected value");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse::not_ready("unexpected health check result")),
            )
        }
        Err(e) => {
            warn!(error = %e, "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse::not_ready(e)),
            )
        }
    }
}
