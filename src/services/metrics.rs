use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Row};
use std::time::Instant;
use tracing::{debug, info};
use utoipa::ToSchema;

/// Used when the server does not report `max_connections`
pub const DEFAULT_MAX_CONNECTIONS: i64 = 100;

/// Point-in-time statistics for the connected database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DatabaseMetrics {
    pub database_size_bytes: i64,
    pub active_connections: i64,
    pub max_connections: i64,
    pub connection_usage_percent: f64,
    pub transactions_committed: i64,
    pub transactions_rolled_back: i64,
    pub blocks_read: i64,
    pub blocks_hit: i64,
    pub cache_hit_ratio: f64,
    /// Bytes received but not yet replayed; only reported on a standby
    pub replication_lag_bytes: Option<i64>,
    pub is_in_recovery: bool,
    pub timestamp: DateTime<Utc>,
}

/// Error types for metrics collection
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to retrieve metrics: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Default, Clone, Copy)]
struct DatabaseCounters {
    committed: i64,
    rolled_back: i64,
    blocks_read: i64,
    blocks_hit: i64,
}

/// Collects [`DatabaseMetrics`] with a fixed set of catalog queries
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    db_pool: PgPool,
}

impl MetricsCollector {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Run every query on one pooled connection; any failure fails the whole call
    pub async fn collect(&self) -> Result<DatabaseMetrics, MetricsError> {
        let start = Instant::now();
        let mut conn = self.db_pool.acquire().await?;

        let database_size_bytes: i64 =
            sqlx::query("SELECT pg_database_size(current_database()) AS size_bytes")
                .fetch_one(&mut *conn)
                .await?
                .try_get("size_bytes")?;

        let active_connections: i64 = sqlx::query(
            "SELECT count(*) AS active FROM pg_stat_activity WHERE state = 'active'",
        )
        .fetch_one(&mut *conn)
        .await?
        .try_get("active")?;

        let max_connections = fetch_max_connections(&mut conn).await?;
        let counters = fetch_counters(&mut conn).await?;

        let is_in_recovery: bool = sqlx::query("SELECT pg_is_in_recovery() AS in_recovery")
            .fetch_one(&mut *conn)
            .await?
            .try_get("in_recovery")?;

        let replication_lag_bytes = if is_in_recovery {
            fetch_replication_lag(&mut conn).await?
        } else {
            None
        };

        let metrics = DatabaseMetrics {
            database_size_bytes,
            active_connections,
            max_connections,
            connection_usage_percent: connection_usage_percent(active_connections, max_connections),
            transactions_committed: counters.committed,
            transactions_rolled_back: counters.rolled_back,
            blocks_read: counters.blocks_read,
            blocks_hit: counters.blocks_hit,
            cache_hit_ratio: cache_hit_ratio(counters.blocks_hit, counters.blocks_read),
            replication_lag_bytes,
            is_in_recovery,
            timestamp: Utc::now(),
        };

        info!(
            active_connections,
            max_connections,
            is_in_recovery,
            duration_ms = start.elapsed().as_millis() as u64,
            "Database metrics collected"
        );

        Ok(metrics)
    }
}

async fn fetch_max_connections(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "SELECT setting::int AS max_connections FROM pg_settings WHERE name = 'max_connections'",
    )
    .fetch_optional(&mut *conn)
    .await?;

    let reported = match row {
        Some(row) => row.try_get::<Option<i32>, _>("max_connections")?,
        None => None,
    };
    if reported.is_none() {
        debug!("max_connections not reported, using default {DEFAULT_MAX_CONNECTIONS}");
    }
    Ok(reported.map_or(DEFAULT_MAX_CONNECTIONS, i64::from))
}

async fn fetch_counters(conn: &mut PgConnection) -> Result<DatabaseCounters, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT xact_commit, xact_rollback, blks_read, blks_hit
        FROM pg_stat_database
        WHERE datname = current_database()
        "#,
    )
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(DatabaseCounters::default());
    };

    Ok(DatabaseCounters {
        committed: row.try_get::<Option<i64>, _>("xact_commit")?.unwrap_or(0),
        rolled_back: row.try_get::<Option<i64>, _>("xact_rollback")?.unwrap_or(0),
        blocks_read: row.try_get::<Option<i64>, _>("blks_read")?.unwrap_or(0),
        blocks_hit: row.try_get::<Option<i64>, _>("blks_hit")?.unwrap_or(0),
    })
}

async fn fetch_replication_lag(conn: &mut PgConnection) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query(
        "SELECT pg_wal_lsn_diff(pg_last_wal_receive_lsn(), pg_last_wal_replay_lsn())::bigint AS lag_bytes",
    )
    .fetch_one(&mut *conn)
    .await?
    .try_get("lag_bytes")
}

/// Share of block reads served from shared buffers, in percent
///
/// An idle database (no reads, no hits) counts as a perfect cache.
pub fn cache_hit_ratio(blocks_hit: i64, blocks_read: i64) -> f64 {
    let total = blocks_hit.saturating_add(blocks_read);
    if total <= 0 {
        return 100.0;
    }
    round2(blocks_hit as f64 / total as f64 * 100.0)
}

/// Active connections as a percentage of `max_connections`; 0 when max is 0
pub fn connection_usage_percent(active: i64, max: i64) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    round2(active as f64 / max as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cache_hit_ratio() {
        assert_eq!(cache_hit_ratio(0, 0), 100.0);
        assert_eq!(cache_hit_ratio(9, 1), 90.0);
        assert_eq!(cache_hit_ratio(0, 10), 0.0);
        assert_eq!(cache_hit_ratio(2, 1), 66.67);
    }

    #[test]
    fn test_connection_usage_percent() {
        assert_eq!(connection_usage_percent(0, 0), 0.0);
        assert_eq!(connection_usage_percent(5, 0), 0.0);
        assert_eq!(connection_usage_percent(25, 100), 25.0);
        assert_eq!(connection_usage_percent(1, 3), 33.33);
    }

    #[test]
    fn test_error_message() {
        let err = MetricsError::from(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Failed to retrieve metrics: "));
    }

    #[test]
    fn test_metrics_serialize_optional_lag() {
        let metrics = DatabaseMetrics {
            database_size_bytes: 8_000_000,
            active_connections: 1,
            max_connections: 100,
            connection_usage_percent: 1.0,
            transactions_committed: 10,
            transactions_rolled_back: 0,
            blocks_read: 1,
            blocks_hit: 9,
            cache_hit_ratio: 90.0,
            replication_lag_bytes: None,
            is_in_recovery: false,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json["replication_lag_bytes"].is_null());
        assert_eq!(json["cache_hit_ratio"], 90.0);
    }

    proptest! {
        #[test]
        fn cache_hit_ratio_is_a_percentage(hit in 0i64..1_000_000_000, read in 0i64..1_000_000_000) {
            let ratio = cache_hit_ratio(hit, read);
            prop_assert!((0.0..=100.0).contains(&ratio));
        }

        #[test]
        fn connection_usage_is_bounded_when_active_within_max(max in 1i64..10_000, frac in 0.0f64..=1.0) {
            let active = (max as f64 * frac) as i64;
            let usage = connection_usage_percent(active, max);
            prop_assert!((0.0..=100.0).contains(&usage));
        }
    }
}
