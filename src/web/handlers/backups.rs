use axum::extract::State;
use axum::Json;

use crate::backup::BackupStatusReport;
use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

/// pgBackRest status for the configured stanza: GET /backups
///
/// Degraded states (tool missing, timeout, failing run) are 200 answers
/// carrying the matching `status`.
#[utoipa::path(
    get,
    path = "/backups",
    responses(
        (status = 200, description = "Backup status report", body = BackupStatusReport),
        (status = 500, description = "Unexpected failure running the backup tool", body = crate::error::ErrorBody)
    ),
    tag = "monitoring"
)]
pub async fn get_backup_status(
    State(state): State<AppState>,
) -> ApiResult<Json<BackupStatusReport>> {
    state
        .backups
        .get_backup_status()
        .await
        .map(Json)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))
}
