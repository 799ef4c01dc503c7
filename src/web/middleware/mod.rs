//! # Web Middleware
//!
//! Only request-id tagging lives here; CORS, tracing and timeouts come from
//! `tower-http` layers in [`crate::web::create_app`].

pub mod request_id;
