//! # Data Models
//!
//! Persistent types and their queries. Queries take a `&PgPool` and return
//! `sqlx::Error`; translating failures into HTTP responses is left to the web
//! layer.

pub mod item;

pub use item::{Item, ItemPatch, ListItemsQuery, NewItem, ValidationError};
