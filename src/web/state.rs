//! # Web API Application State
//!
//! Shared state handed to every handler: the immutable settings, the single
//! database pool and the services built on top of them.

use crate::backup::{BackupStatusService, BackupToolRunner, PgBackRestCommand};
use crate::config::Settings;
use crate::services::MetricsCollector;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db_pool: PgPool,
    pub backups: BackupStatusService,
    pub metrics: MetricsCollector,
}

impl AppState {
    /// State backed by the real `pgbackrest` executable from the settings
    pub fn from_settings(settings: Settings, db_pool: PgPool) -> Self {
        let runner = Arc::new(PgBackRestCommand::from_config(&settings.backup));
        Self::with_backup_runner(settings, db_pool, runner)
    }

    /// State with a caller-supplied backup runner
    pub fn with_backup_runner(
        settings: Settings,
        db_pool: PgPool,
        runner: Arc<dyn BackupToolRunner>,
    ) -> Self {
        let backups = BackupStatusService::new(runner, settings.backup.stanza.clone());
        let metrics = MetricsCollector::new(db_pool.clone());

        info!(
            app = %settings.app.name,
            version = %settings.app.version,
            stanza = %settings.backup.stanza,
            "Web API state initialized"
        );

        Self {
            settings: Arc::new(settings),
            db_pool,
            backups,
            metrics,
        }
    }
}
