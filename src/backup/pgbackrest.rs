//! Typed decode of `pgbackrest info --output=json`.
//!
//! The tool emits a JSON array with one block per stanza. Only the fields the
//! status report needs are modelled; everything else is ignored. Every field
//! is optional so that partially populated blocks (a stanza with no backups,
//! a backup still running without a stop time) decode without error. The
//! defaults applied to absent fields are part of the decode contract:
//!
//! | field                        | absent / null means            |
//! |------------------------------|--------------------------------|
//! | `status.code`                | [`UNKNOWN_STATUS_CODE`] (99)   |
//! | `status.message`             | `"Unknown"`                    |
//! | `backup`, `archive`          | empty list                     |
//! | `backup[].label`             | `"unknown"`                    |
//! | `backup[].type`              | unknown backup type            |
//! | `backup[].timestamp.*`       | no instant                     |
//! | `backup[].info.size`         | no size                        |
//! | `backup[].info.repository.*` | no repository size             |
//! | `archive[].min` / `max`      | no WAL segment                 |

use serde::Deserialize;

/// Status code assumed when a stanza block carries none
pub const UNKNOWN_STATUS_CODE: i64 = 99;

/// Status message assumed when a stanza block carries none
pub const UNKNOWN_STATUS_MESSAGE: &str = "Unknown";

/// Label assumed for a backup entry without one
pub const UNKNOWN_LABEL: &str = "unknown";

/// One element of the top-level array
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StanzaInfo {
    pub name: Option<String>,
    pub status: Option<StanzaStatus>,
    pub backup: Option<Vec<BackupEntry>>,
    pub archive: Option<Vec<ArchiveEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StanzaStatus {
    pub code: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupEntry {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub backup_type: Option<String>,
    pub timestamp: Option<BackupTimestamps>,
    pub info: Option<BackupSizes>,
}

/// Unix epoch seconds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupTimestamps {
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupSizes {
    pub size: Option<i64>,
    pub repository: Option<RepositorySizes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositorySizes {
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveEntry {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl StanzaInfo {
    pub fn status_code(&self) -> i64 {
        self.status
            .as_ref()
            .and_then(|s| s.code)
            .unwrap_or(UNKNOWN_STATUS_CODE)
    }

    pub fn status_message(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.message.as_deref())
            .unwrap_or(UNKNOWN_STATUS_MESSAGE)
    }

    pub fn backups(&self) -> &[BackupEntry] {
        self.backup.as_deref().unwrap_or_default()
    }

    pub fn archives(&self) -> &[ArchiveEntry] {
        self.archive.as_deref().unwrap_or_default()
    }
}

impl BackupEntry {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn start(&self) -> Option<i64> {
        self.timestamp.as_ref().and_then(|t| t.start)
    }

    pub fn stop(&self) -> Option<i64> {
        self.timestamp.as_ref().and_then(|t| t.stop)
    }

    pub fn size(&self) -> Option<i64> {
        self.info.as_ref().and_then(|i| i.size)
    }

    pub fn repository_size(&self) -> Option<i64> {
        self.info
            .as_ref()
            .and_then(|i| i.repository.as_ref())
            .and_then(|r| r.size)
    }
}

/// Decode the full `info` payload
///
/// `null`, `[]` and `{}` carry no stanza and decode to an empty list; any
/// other non-array value is a decode error.
pub fn parse_info(stdout: &str) -> Result<Vec<StanzaInfo>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(stdout)?;
    if is_empty_payload(&value) {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
}

fn is_empty_payload(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_real_world_block() {
        let json = r#"[{
            "name": "main",
            "status": {"code": 0, "message": "ok", "lock": {"backup": {"held": false}}},
            "backup": [{
                "label": "20250115-120000F",
                "type": "full",
                "timestamp": {"start": 1705320000, "stop": 1705320600},
                "info": {"size": 1073741824, "delta": 1073741824,
                         "repository": {"size": 536870912, "delta": 536870912}}
            }],
            "archive": [{"id": "17-1", "min": "000000010000000000000001", "max": "000000010000000000000010"}],
            "db": [{"id": 1, "system-id": 7301234567890123456, "version": "17"}]
        }]"#;

        let stanzas = parse_info(json).unwrap();
        assert_eq!(stanzas.len(), 1);
        let info = &stanzas[0];
        assert_eq!(info.status_code(), 0);
        assert_eq!(info.status_message(), "ok");
        assert_eq!(info.backups()[0].label(), "20250115-120000F");
        assert_eq!(info.backups()[0].stop(), Some(1705320600));
        assert_eq!(info.backups()[0].repository_size(), Some(536870912));
        assert_eq!(
            info.archives()[0].max.as_deref(),
            Some("000000010000000000000010")
        );
    }

    #[test]
    fn test_missing_fields_take_documented_defaults() {
        let stanzas = parse_info(r#"[{"backup": [{}]}]"#).unwrap();
        let info = &stanzas[0];
        assert_eq!(info.status_code(), UNKNOWN_STATUS_CODE);
        assert_eq!(info.status_message(), UNKNOWN_STATUS_MESSAGE);
        assert!(info.archives().is_empty());

        let entry = &info.backups()[0];
        assert_eq!(entry.label(), UNKNOWN_LABEL);
        assert_eq!(entry.start(), None);
        assert_eq!(entry.size(), None);
        assert_eq!(entry.repository_size(), None);
    }

    #[test]
    fn test_null_intermediate_objects_tolerated() {
        let stanzas =
            parse_info(r#"[{"status": null, "backup": [{"timestamp": null, "info": {"repository": null}}], "archive": null}]"#)
                .unwrap();
        let entry = &stanzas[0].backups()[0];
        assert_eq!(entry.stop(), None);
        assert_eq!(entry.repository_size(), None);
        assert!(stanzas[0].archives().is_empty());
    }

    #[test]
    fn test_empty_payloads_decode_to_no_stanzas() {
        for payload in ["[]", "{}", "null", " null\n"] {
            assert!(parse_info(payload).unwrap().is_empty(), "payload {payload:?}");
        }
    }

    #[test]
    fn test_scalar_payload_is_an_error() {
        assert!(parse_info("42").is_err());
        assert!(parse_info("").is_err());
    }

    #[test]
    fn test_object_instead_of_array_is_an_error() {
        assert!(parse_info(r#"{"status": {"code": 0}}"#).is_err());
    }
}
