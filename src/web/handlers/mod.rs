//! # Web API Handlers
//!
//! One module per endpoint group. Handlers stay thin: decode, call the domain
//! module, map failures to [`crate::error::ApiError`].

pub mod backups;
pub mod health;
pub mod items;
pub mod metrics;
