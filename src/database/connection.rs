use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::{info, warn};

/// Owned connection pool for the lifetime of the server
///
/// The pool connects lazily so the process can start (and answer `/health`)
/// while the database is still unreachable; `/ready` reports the difference.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min_size)
            .max_connections(config.pool_max_size)
            .acquire_timeout(config.acquire_timeout())
            .test_before_acquire(true)
            .connect_lazy_with(config.connect_options());

        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            min_connections = config.pool_min_size,
            max_connections = config.pool_max_size,
            "Database pool configured"
        );

        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        health_check(&self.pool).await
    }

    /// Open a first connection so configuration problems show up in the startup log
    ///
    /// Failure is logged and tolerated; the service keeps running degraded.
    pub async fn warm_up(&self) -> bool {
        match self.health_check().await {
            Ok(true) => {
                info!("Database connection pool initialized");
                true
            }
            Ok(false) => {
                warn!("Database answered the startup probe with an unexpected value");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize database pool; database features unavailable until it recovers");
                false
            }
        }
    }

    pub async fn close(self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

/// One trivial round trip through the pool
pub async fn health_check(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 AS health").fetch_one(pool).await?;
    let health: i32 = row.try_get("health")?;
    Ok(health == 1)
}
