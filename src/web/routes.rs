//! # Web API Route Definitions

use crate::web::handlers;
use crate::web::openapi::ApiDoc;
use crate::web::state::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_PATH: &str = "/openapi.json";
pub const SWAGGER_UI_PATH: &str = "/docs";
pub const REDOC_PATH: &str = "/redoc";

/// Probes and the service index
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_probe))
}

/// Database and backup monitoring
pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(handlers::metrics::get_metrics))
        .route("/backups", get(handlers::backups::get_backup_status))
}

/// Demo CRUD resource
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route(
            "/items/:id",
            get(handlers::items::get_item)
                .put(handlers::items::update_item)
                .delete(handlers::items::delete_item),
        )
}

/// API documentation
///
/// - `/openapi.json` - OpenAPI JSON specification
/// - `/docs` - Swagger UI interface for interactive API exploration
/// - `/redoc` - Redoc rendering of the same document
pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .merge(Redoc::with_url(REDOC_PATH, ApiDoc::openapi()))
}
