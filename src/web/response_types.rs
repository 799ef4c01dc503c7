//! Response bodies that belong to no particular domain module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";
pub const STATUS_NOT_READY: &str = "not_ready";
pub const DATABASE_CONNECTED: &str = "connected";

/// Liveness body; always `healthy` while the process serves requests
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Readiness body, shared by the 200 and 503 answers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    /// `ready` or `not_ready`
    pub status: String,
    /// `connected` or `error: <detail>`
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

impl ReadyResponse {
    pub fn ready() -> Self {
        Self {
            status: STATUS_READY.to_string(),
            database: DATABASE_CONNECTED.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn not_ready(detail: impl std::fmt::Display) -> Self {
        Self {
            status: STATUS_NOT_READY.to_string(),
            database: format!("error: {detail}"),
            timestamp: Utc::now(),
        }
    }
}

/// Service index served at `/`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub docs: String,
    pub health: String,
    pub ready: String,
}
