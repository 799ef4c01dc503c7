//! Invocation of the pgBackRest executable.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::BackupConfig;

/// Captured result of a finished tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Reasons a run produced no [`ToolOutput`]
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("executable '{command}' was not found")]
    NotInstalled { command: String },

    #[error("'{command}' did not finish within {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("failed to run '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs `info` for a stanza and returns whatever the tool printed
#[async_trait]
pub trait BackupToolRunner: Send + Sync + std::fmt::Debug {
    async fn info(&self, stanza: &str) -> Result<ToolOutput, RunnerError>;
}

/// Subprocess runner for the real executable
#[derive(Debug, Clone)]
pub struct PgBackRestCommand {
    command: String,
    timeout: Duration,
}

impl PgBackRestCommand {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BackupConfig) -> Self {
        Self::new(config.command.clone(), config.timeout())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl BackupToolRunner for PgBackRestCommand {
    async fn info(&self, stanza: &str) -> Result<ToolOutput, RunnerError> {
        debug!(command = %self.command, stanza = %stanza, timeout = ?self.timeout, "Running pgBackRest info");

        // kill_on_drop reaps the child when the timeout drops the future
        let run = Command::new(&self.command)
            .arg("--stanza")
            .arg(stanza)
            .arg("info")
            .arg("--output=json")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => {
                return Err(RunnerError::TimedOut {
                    command: self.command.clone(),
                    timeout: self.timeout,
                })
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(RunnerError::NotInstalled {
                    command: self.command.clone(),
                })
            }
            Ok(Err(e)) => {
                return Err(RunnerError::Io {
                    command: self.command.clone(),
                    source: e,
                })
            }
            Ok(Ok(output)) => output,
        };

        Ok(ToolOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
