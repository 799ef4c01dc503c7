//! # Database Operations
//!
//! - [`connection`] - the owned connection pool and its health probe
//! - [`schema`] - on-demand creation of the demo table
//!
//! ```rust,no_run
//! use pgha_api::config::Settings;
//! use pgha_api::database::DatabaseConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let db = DatabaseConnection::from_config(&settings.database);
//! let healthy = db.health_check().await?;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod schema;

pub use connection::{health_check, DatabaseConnection};
pub use schema::ensure_items_table;
