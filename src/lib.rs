#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # PostgreSQL HA/DR Demo API
//!
//! Monitoring and demo-CRUD HTTP API in front of a PostgreSQL cluster.
//!
//! ## Overview
//!
//! Every endpoint is a single-shot translation of one external call into a
//! JSON response: a SQL query against the pool, or a `pgbackrest info`
//! invocation. Nothing is cached and nothing is retried.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered settings (defaults, TOML file, environment)
//! - [`database`] - Connection pool and demo schema
//! - [`backup`] - pgBackRest status translation
//! - [`services`] - Database metrics collection
//! - [`models`] - The demo `items` resource
//! - [`web`] - Axum router, handlers and middleware
//! - [`error`] - HTTP error mapping
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pgha_api::config::ConfigManager;
//! use pgha_api::database::DatabaseConnection;
//! use pgha_api::web::{create_app, state::AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ConfigManager::load()?;
//! let database = DatabaseConnection::from_config(&settings.database);
//! let app = create_app(AppState::from_settings(settings, database.pool().clone()));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                       # Unit and router tests, no database needed
//! cargo test --features db-tests   # Item round trips, needs DATABASE_URL
//! ```

pub mod backup;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod web;

pub use backup::{BackupStatus, BackupStatusReport, BackupStatusService};
pub use config::{ConfigManager, Settings};
pub use error::{ApiError, ApiResult};
