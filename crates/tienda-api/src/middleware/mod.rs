//! # Middleware Modules
//!
//! Request-scoped layers for the API service. Tracing itself comes from
//! `tower-http`'s `TraceLayer`, assembled in `lib.rs`; these modules add
//! what it does not cover.

pub mod metrics;
pub mod request_id;
