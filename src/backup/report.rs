//! Backup status report and the translation from pgBackRest output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pgbackrest::{self, BackupEntry, StanzaInfo};
use super::runner::ToolOutput;

pub const NOT_INSTALLED_MESSAGE: &str = "pgBackRest is not installed on this system";
pub const TIMEOUT_MESSAGE: &str = "pgBackRest command timed out";
pub const NO_STANZA_MESSAGE: &str = "No stanza information available";

/// Overall backup status taxonomy
///
/// The first four variants come from the stanza's own status code; the rest
/// describe why no status could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    Ok,
    MissingStanza,
    NoBackup,
    Error,
    Unavailable,
    NoStanza,
    Timeout,
    NotInstalled,
    ParseError,
}

impl BackupStatus {
    /// Map a pgBackRest stanza status code
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => BackupStatus::Ok,
            1 => BackupStatus::MissingStanza,
            2 => BackupStatus::NoBackup,
            _ => BackupStatus::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Ok => "ok",
            BackupStatus::MissingStanza => "missing_stanza",
            BackupStatus::NoBackup => "no_backup",
            BackupStatus::Error => "error",
            BackupStatus::Unavailable => "unavailable",
            BackupStatus::NoStanza => "no_stanza",
            BackupStatus::Timeout => "timeout",
            BackupStatus::NotInstalled => "not_installed",
            BackupStatus::ParseError => "parse_error",
        }
    }
}

impl std::fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backup type using pgBackRest's own labels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BackupType {
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "diff")]
    Differential,
    #[serde(rename = "incr")]
    Incremental,
    #[serde(rename = "unknown")]
    Unknown,
}

impl BackupType {
    /// Anything other than `full`, `diff` or `incr` is unknown
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("full") => BackupType::Full,
            Some("diff") => BackupType::Differential,
            Some("incr") => BackupType::Incremental,
            _ => BackupType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BackupRecord {
    pub label: String,
    #[serde(rename = "type")]
    pub backup_type: BackupType,
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    pub size_bytes: Option<i64>,
    /// Size of the backup as stored in the repository (compressed)
    pub database_size_bytes: Option<i64>,
}

impl BackupRecord {
    fn from_entry(entry: &BackupEntry) -> Self {
        Self {
            label: entry.label().to_string(),
            backup_type: BackupType::from_label(entry.backup_type.as_deref()),
            start_time: entry.start().and_then(from_unix_seconds),
            stop_time: entry.stop().and_then(from_unix_seconds),
            size_bytes: entry.size(),
            database_size_bytes: entry.repository_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WalArchiveRange {
    pub min_wal: Option<String>,
    pub max_wal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BackupStatusReport {
    pub stanza: String,
    pub status: BackupStatus,
    pub status_message: Option<String>,
    /// In the order pgBackRest lists them (oldest first)
    pub backups: Vec<BackupRecord>,
    pub wal_archive: Option<WalArchiveRange>,
    pub last_full_backup: Option<DateTime<Utc>>,
    pub last_diff_backup: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl BackupStatusReport {
    /// Report for a state in which no backup list could be read
    pub fn degraded(stanza: &str, status: BackupStatus, message: impl Into<String>) -> Self {
        Self {
            stanza: stanza.to_string(),
            status,
            status_message: Some(message.into()),
            backups: Vec::new(),
            wal_archive: None,
            last_full_backup: None,
            last_diff_backup: None,
            timestamp: Utc::now(),
        }
    }

    pub fn not_installed(stanza: &str) -> Self {
        Self::degraded(stanza, BackupStatus::NotInstalled, NOT_INSTALLED_MESSAGE)
    }

    pub fn timed_out(stanza: &str) -> Self {
        Self::degraded(stanza, BackupStatus::Timeout, TIMEOUT_MESSAGE)
    }

    /// Translate a completed tool invocation
    pub fn from_tool_output(stanza: &str, output: &ToolOutput) -> Self {
        if !output.success {
            let stderr = output.stderr.trim();
            let detail = if stderr.is_empty() {
                "Unknown error"
            } else {
                stderr
            };
            return Self::degraded(
                stanza,
                BackupStatus::Unavailable,
                format!("pgBackRest error: {detail}"),
            );
        }

        Self::from_info_json(stanza, &output.stdout)
    }

    /// Translate the JSON printed by `pgbackrest info --output=json`
    pub fn from_info_json(stanza: &str, stdout: &str) -> Self {
        let stanzas = match pgbackrest::parse_info(stdout) {
            Ok(stanzas) => stanzas,
            Err(e) => {
                return Self::degraded(
                    stanza,
                    BackupStatus::ParseError,
                    format!("Failed to parse pgBackRest output: {e}"),
                )
            }
        };

        match stanzas.first() {
            Some(info) => Self::from_stanza_info(stanza, info),
            None => Self::degraded(stanza, BackupStatus::NoStanza, NO_STANZA_MESSAGE),
        }
    }

    fn from_stanza_info(stanza: &str, info: &StanzaInfo) -> Self {
        let status = BackupStatus::from_code(info.status_code());
        let status_message = match status {
            BackupStatus::Ok => None,
            _ => Some(info.status_message().to_string()),
        };

        let backups: Vec<BackupRecord> = info.backups().iter().map(BackupRecord::from_entry).collect();
        let last_full_backup = latest_stop_time(&backups, BackupType::Full);
        let last_diff_backup = latest_stop_time(&backups, BackupType::Differential);

        let wal_archive = info.archives().first().map(|archive| WalArchiveRange {
            min_wal: archive.min.clone(),
            max_wal: archive.max.clone(),
        });

        Self {
            stanza: stanza.to_string(),
            status,
            status_message,
            backups,
            wal_archive,
            last_full_backup,
            last_diff_backup,
            timestamp: Utc::now(),
        }
    }
}

/// Latest `stop_time` among records of one type
///
/// Records without a stop time are skipped. Only a strictly later time
/// replaces the running maximum, so the first of several equal maxima wins.
pub fn latest_stop_time(records: &[BackupRecord], backup_type: BackupType) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter(|record| record.backup_type == backup_type)
        .filter_map(|record| record.stop_time)
        .fold(None, |latest, stop| match latest {
            Some(current) if stop <= current => Some(current),
            _ => Some(stop),
        })
}

/// Out-of-range values are treated as absent
fn from_unix_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ok_output(stdout: &str) -> ToolOutput {
        ToolOutput {
            exit_code: Some(0),
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn failed_output(code: i32, stderr: &str) -> ToolOutput {
        ToolOutput {
            exit_code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn record(backup_type: BackupType, stop: Option<i64>) -> BackupRecord {
        BackupRecord {
            label: "b".to_string(),
            backup_type,
            start_time: None,
            stop_time: stop.and_then(from_unix_seconds),
            size_bytes: None,
            database_size_bytes: None,
        }
    }

    fn ts(seconds: i64) -> DateTime<Utc> {
        from_unix_seconds(seconds).unwrap()
    }

    const HEALTHY: &str = r#"[{
        "status": {"code": 0, "message": "ok"},
        "backup": [
            {"label": "20250115-120000F", "type": "full",
             "timestamp": {"start": 1705320000, "stop": 1705320600},
             "info": {"size": 1073741824, "repository": {"size": 536870912}}},
            {"label": "20250115-120000F_20250116-120000D", "type": "diff",
             "timestamp": {"start": 1705406400, "stop": 1705406700},
             "info": {"size": 2048, "repository": {"size": 1024}}},
            {"label": "20250115-120000F_20250117-120000I", "type": "incr",
             "timestamp": {"start": 1705492800, "stop": 1705492900}}
        ],
        "archive": [{"min": "000000010000000000000001", "max": "000000010000000000000010"}]
    }]"#;

    #[test]
    fn test_healthy_stanza() {
        let report = BackupStatusReport::from_tool_output("main", &ok_output(HEALTHY));

        assert_eq!(report.stanza, "main");
        assert_eq!(report.status, BackupStatus::Ok);
        assert_eq!(report.status_message, None);
        assert_eq!(report.backups.len(), 3);
        assert_eq!(report.backups[0].backup_type, BackupType::Full);
        assert_eq!(report.backups[0].start_time, Some(ts(1705320000)));
        assert_eq!(report.backups[0].size_bytes, Some(1073741824));
        assert_eq!(report.backups[0].database_size_bytes, Some(536870912));
        assert_eq!(report.backups[2].backup_type, BackupType::Incremental);
        assert_eq!(report.backups[2].size_bytes, None);
        assert_eq!(report.last_full_backup, Some(ts(1705320600)));
        assert_eq!(report.last_diff_backup, Some(ts(1705406700)));

        let wal = report.wal_archive.unwrap();
        assert_eq!(wal.min_wal.as_deref(), Some("000000010000000000000001"));
        assert_eq!(wal.max_wal.as_deref(), Some("000000010000000000000010"));
    }

    #[test]
    fn test_non_zero_exit_is_unavailable() {
        let report =
            BackupStatusReport::from_tool_output("main", &failed_output(1, "  stanza not found\n"));
        assert_eq!(report.status, BackupStatus::Unavailable);
        assert_eq!(
            report.status_message.as_deref(),
            Some("pgBackRest error: stanza not found")
        );
        assert!(report.backups.is_empty());
    }

    #[test]
    fn test_non_zero_exit_with_empty_stderr() {
        let report = BackupStatusReport::from_tool_output("main", &failed_output(28, "   "));
        assert_eq!(report.status, BackupStatus::Unavailable);
        assert_eq!(
            report.status_message.as_deref(),
            Some("pgBackRest error: Unknown error")
        );
    }

    #[test]
    fn test_non_zero_exit_ignores_stdout() {
        let mut output = failed_output(1, "boom");
        output.stdout = HEALTHY.to_string();
        let report = BackupStatusReport::from_tool_output("main", &output);
        assert_eq!(report.status, BackupStatus::Unavailable);
        assert!(report.backups.is_empty());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let report = BackupStatusReport::from_tool_output("main", &ok_output("[{not json"));
        assert_eq!(report.status, BackupStatus::ParseError);
        let message = report.status_message.unwrap();
        assert!(message.starts_with("Failed to parse pgBackRest output: "));
        assert!(message.len() > "Failed to parse pgBackRest output: ".len());
        assert!(report.backups.is_empty());
    }

    #[test]
    fn test_empty_stdout_is_parse_error() {
        let report = BackupStatusReport::from_tool_output("main", &ok_output(""));
        assert_eq!(report.status, BackupStatus::ParseError);
    }

    #[test]
    fn test_empty_array_is_no_stanza() {
        let report = BackupStatusReport::from_tool_output("main", &ok_output("[]"));
        assert_eq!(report.status, BackupStatus::NoStanza);
        assert_eq!(report.status_message.as_deref(), Some(NO_STANZA_MESSAGE));
        assert!(report.backups.is_empty());
        assert!(report.wal_archive.is_none());
    }

    #[test]
    fn test_empty_object_and_null_are_no_stanza() {
        for payload in ["{}", "null"] {
            let report = BackupStatusReport::from_tool_output("main", &ok_output(payload));
            assert_eq!(report.status, BackupStatus::NoStanza, "payload {payload}");
            assert_eq!(report.status_message.as_deref(), Some(NO_STANZA_MESSAGE));
            assert!(report.backups.is_empty());
        }
    }

    #[test]
    fn test_status_code_mapping_and_messages() {
        let cases = [
            (0, BackupStatus::Ok),
            (1, BackupStatus::MissingStanza),
            (2, BackupStatus::NoBackup),
            (3, BackupStatus::Error),
            (99, BackupStatus::Error),
        ];
        for (code, expected) in cases {
            let json = format!(r#"[{{"status": {{"code": {code}, "message": "msg {code}"}}}}]"#);
            let report = BackupStatusReport::from_info_json("main", &json);
            assert_eq!(report.status, expected, "code {code}");
            if expected == BackupStatus::Ok {
                assert_eq!(report.status_message, None);
            } else {
                assert_eq!(report.status_message, Some(format!("msg {code}")));
            }
        }
    }

    #[test]
    fn test_missing_status_block_defaults_to_error_unknown() {
        let report = BackupStatusReport::from_info_json("main", r#"[{"backup": []}]"#);
        assert_eq!(report.status, BackupStatus::Error);
        assert_eq!(report.status_message.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_no_backup_stanza() {
        let json = r#"[{"status": {"code": 2, "message": "no valid backups"}, "backup": [], "archive": []}]"#;
        let report = BackupStatusReport::from_info_json("main", json);
        assert_eq!(report.status, BackupStatus::NoBackup);
        assert!(report.backups.is_empty());
        assert!(report.wal_archive.is_none());
        assert!(report.last_full_backup.is_none());
    }

    #[test]
    fn test_only_first_stanza_is_used() {
        let json = r#"[{"status": {"code": 0}}, {"status": {"code": 1}}]"#;
        let report = BackupStatusReport::from_info_json("main", json);
        assert_eq!(report.status, BackupStatus::Ok);
    }

    #[test]
    fn test_entry_defaults() {
        let json = r#"[{"status": {"code": 0}, "backup": [{"type": "snapshot"}]}]"#;
        let report = BackupStatusReport::from_info_json("main", json);
        let backup = &report.backups[0];
        assert_eq!(backup.label, "unknown");
        assert_eq!(backup.backup_type, BackupType::Unknown);
        assert_eq!(backup.start_time, None);
        assert_eq!(backup.stop_time, None);
    }

    #[test]
    fn test_archive_with_null_bounds() {
        let json = r#"[{"status": {"code": 0}, "archive": [{"min": null, "max": "0000000100000000000000AA"}]}]"#;
        let report = BackupStatusReport::from_info_json("main", json);
        let wal = report.wal_archive.unwrap();
        assert_eq!(wal.min_wal, None);
        assert_eq!(wal.max_wal.as_deref(), Some("0000000100000000000000AA"));
    }

    #[test]
    fn test_latest_full_regardless_of_order() {
        let records = vec![
            record(BackupType::Full, Some(2_000)),
            record(BackupType::Full, Some(1_000)),
        ];
        assert_eq!(latest_stop_time(&records, BackupType::Full), Some(ts(2_000)));
    }

    #[test]
    fn test_record_without_stop_time_is_skipped() {
        let records = vec![
            record(BackupType::Full, None),
            record(BackupType::Differential, None),
        ];
        assert_eq!(latest_stop_time(&records, BackupType::Full), None);
        assert_eq!(latest_stop_time(&records, BackupType::Differential), None);
    }

    #[test]
    fn test_incremental_backups_do_not_count() {
        let records = vec![
            record(BackupType::Incremental, Some(5_000)),
            record(BackupType::Full, Some(1_000)),
        ];
        assert_eq!(latest_stop_time(&records, BackupType::Full), Some(ts(1_000)));
        assert_eq!(latest_stop_time(&records, BackupType::Differential), None);
    }

    #[test]
    fn test_serialized_shape() {
        let report = BackupStatusReport::from_info_json("main", HEALTHY);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value["status_message"].is_null());
        assert_eq!(value["backups"][1]["type"], "diff");
        assert_eq!(value["backups"][0]["stop_time"], "2024-01-15T12:10:00Z");
        assert_eq!(value["wal_archive"]["min_wal"], "000000010000000000000001");

        let degraded = serde_json::to_value(BackupStatusReport::not_installed("main")).unwrap();
        assert_eq!(degraded["status"], "not_installed");
        assert_eq!(degraded["backups"], serde_json::json!([]));
    }

    proptest! {
        #[test]
        fn prop_latest_full_is_order_independent(
            stops in proptest::collection::vec(proptest::option::of(0i64..4_000_000_000), 0..20)
        ) {
            let forward: Vec<BackupRecord> =
                stops.iter().map(|s| record(BackupType::Full, *s)).collect();
            let mut backward = forward.clone();
            backward.reverse();

            let expected = stops.iter().flatten().max().map(|s| ts(*s));
            prop_assert_eq!(latest_stop_time(&forward, BackupType::Full), expected);
            prop_assert_eq!(latest_stop_time(&backward, BackupType::Full), expected);
        }
    }
}
