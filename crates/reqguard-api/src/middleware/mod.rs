//! # Middleware
//!
//! - [`validation`]: the request-validation hook.
//! - [`metrics`]: pass/reject/skip counters.
//! - [`tracing_layer`]: per-request tracing spans.

pub mod metrics;
pub mod tracing_layer;
pub mod validation;
