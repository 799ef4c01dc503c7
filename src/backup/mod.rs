//! # Backup Status
//!
//! Translates `pgbackrest info --output=json` into a [`BackupStatusReport`].
//!
//! The endpoint built on this module always answers: a missing executable, a
//! timeout, a failing run, unparseable output and an empty stanza list are
//! each reported through [`BackupStatus`] rather than as request failures.
//!
//! - [`runner`] - subprocess invocation behind the [`BackupToolRunner`] trait
//! - [`pgbackrest`] - typed decode of the tool's JSON with documented defaults
//! - [`report`] - status taxonomy, records and the translation itself
//! - [`service`] - the per-request entry point used by the web layer

pub mod pgbackrest;
pub mod report;
pub mod runner;
pub mod service;

pub use report::{BackupRecord, BackupStatus, BackupStatusReport, BackupType, WalArchiveRange};
pub use runner::{BackupToolRunner, PgBackRestCommand, RunnerError, ToolOutput};
pub use service::{BackupError, BackupStatusService};
