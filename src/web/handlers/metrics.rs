use axum::extract::State;
use axum::Json;

use crate::error::{ApiError, ApiResult};
use crate::logging::log_error;
use crate::services::DatabaseMetrics;
use crate::web::state::AppState;

/// Database statistics: GET /metrics
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Current database statistics", body = DatabaseMetrics),
        (status = 500, description = "Statistics could not be collected", body = crate::error::ErrorBody)
    ),
    tag = "monitoring"
)]
pub async fn get_metrics(State(state): State<AppState>) -> ApiResult<Json<DatabaseMetrics>> {
    state.metrics.collect().await.map(Json).map_err(|e| {
        let message = e.to_string();
        log_error("metrics", "collect", &message);
        ApiError::internal_server_error(message)
    })
}
