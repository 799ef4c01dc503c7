//! # Web API Module
//!
//! Axum-based REST API for the HA/DR demo service.
//!
//! ## Core Components
//!
//! - [`routes`] - HTTP route definitions and organization
//! - [`handlers`] - Request handlers for each endpoint group
//! - [`middleware`] - Request id tagging
//! - [`extractors`] - JSON, path and query extractors with 422 rejections
//! - [`state`] - Shared application state and the database pool
//! - [`openapi`] - Generated OpenAPI document

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response_types;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;

/// Create the main Axum application with all routes and middleware
///
/// # Arguments
/// * `app_state` - Shared application state including the database pool and settings
///
/// # Returns
/// * `Router` - Configured Axum router ready for serving
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = app_state.settings.web.request_timeout();

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::monitoring_routes())
        .merge(routes::item_routes())
        .merge(routes::docs_routes())
        .layer(tower_http::timeout::TimeoutLayer::new(request_timeout))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Outside timeout and CORS so 408s and preflight answers are tagged too
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
