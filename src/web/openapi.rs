//! # OpenAPI Documentation Schemas
//!
//! Generated with utoipa and served as JSON at `/openapi.json`.

use utoipa::OpenApi;

use crate::backup::{BackupRecord, BackupStatus, BackupStatusReport, BackupType, WalArchiveRange};
use crate::error::{ErrorBody, ErrorDetail};
use crate::models::item::{Item, ItemPatch, NewItem};
use crate::services::DatabaseMetrics;
use crate::web::handlers;
use crate::web::response_types::{HealthResponse, ReadyResponse, RootResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PostgreSQL HA/DR Demo API",
        description = "Health, database metrics, pgBackRest backup status and a demo items resource"
    ),
    paths(
        handlers::health::root,
        handlers::health::basic_health,
        handlers::health::readiness_probe,

        handlers::metrics::get_metrics,
        handlers::backups::get_backup_status,

        handlers::items::create_item,
        handlers::items::list_items,
        handlers::items::get_item,
        handlers::items::update_item,
        handlers::items::delete_item,
    ),
    components(schemas(
        RootResponse,
        HealthResponse,
        ReadyResponse,
        DatabaseMetrics,

        BackupStatusReport,
        BackupStatus,
        BackupRecord,
        BackupType,
        WalArchiveRange,

        Item,
        NewItem,
        ItemPatch,

        ErrorBody,
        ErrorDetail,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "monitoring", description = "Database statistics and backup status"),
        (name = "items", description = "Demo CRUD resource")
    )
)]
pub struct ApiDoc;
