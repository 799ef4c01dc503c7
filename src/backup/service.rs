//! Backup status service used by `GET /backups`.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

use super::report::{BackupStatus, BackupStatusReport};
use super::runner::{BackupToolRunner, RunnerError};

/// Failures that cannot be expressed as a [`BackupStatus`]
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to get backup status: {0}")]
    Unexpected(#[source] RunnerError),
}

/// Answers backup status for one configured stanza
#[derive(Debug, Clone)]
pub struct BackupStatusService {
    runner: Arc<dyn BackupToolRunner>,
    stanza: String,
}

impl BackupStatusService {
    pub fn new(runner: Arc<dyn BackupToolRunner>, stanza: impl Into<String>) -> Self {
        Self {
            runner,
            stanza: stanza.into(),
        }
    }

    pub fn stanza(&self) -> &str {
        &self.stanza
    }

    /// Query the tool and translate its answer
    ///
    /// Degraded states (tool missing, timed out, failing, unparseable or
    /// without stanzas) come back as `Ok` with the matching status. Only an
    /// unanticipated spawn or I/O failure is an `Err`.
    pub async fn get_backup_status(&self) -> Result<BackupStatusReport, BackupError> {
        let start = Instant::now();

        let report = match self.runner.info(&self.stanza).await {
            Ok(output) => BackupStatusReport::from_tool_output(&self.stanza, &output),
            Err(RunnerError::NotInstalled { command }) => {
                warn!(command = %command, "pgBackRest executable not found");
                BackupStatusReport::not_installed(&self.stanza)
            }
            Err(RunnerError::TimedOut { command, timeout }) => {
                warn!(command = %command, timeout = ?timeout, "pgBackRest info timed out");
                BackupStatusReport::timed_out(&self.stanza)
            }
            Err(e @ RunnerError::Io { .. }) => {
                error!(stanza = %self.stanza, error = %e, "pgBackRest invocation failed unexpectedly");
                return Err(BackupError::Unexpected(e));
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        if report.status == BackupStatus::Ok {
            info!(
                stanza = %self.stanza,
                backups = report.backups.len(),
                duration_ms,
                "Backup status retrieved"
            );
        } else {
            warn!(
                stanza = %self.stanza,
                status = %report.status,
                message = report.status_message.as_deref(),
                duration_ms,
                "Backup status degraded"
            );
        }

        Ok(report)
    }
}
