//! # reqguard-api — Axum Integration
//!
//! Plugs the reqguard dispatcher into an Axum router and ships a stub
//! server that mounts every declared endpoint behind it.
//!
//! ## Using the validator in your own service
//!
//! ```ignore
//! let cache = SchemaCache::build_all(&ApiDescription::load("api.yaml")?)?;
//! let state = ValidationState::new(Dispatcher::new(Arc::new(cache)));
//! let router = reqguard_api::validated(my_routes, state);
//! ```
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → route match → ValidationMiddleware → Handler
//! ```
//!
//! Validation is a `route_layer`, so it runs after routing and sees the
//! matched template. Unmatched requests never reach it.

pub mod config;
pub mod error;
pub mod middleware;

use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::http::Method;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, on, MethodFilter};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use reqguard_core::{ApiDescription, HttpMethod};
use reqguard_schema::{Dispatcher, SchemaBuildError, SchemaCache};

use crate::config::ApiConfig;
use crate::middleware::metrics::{metrics_middleware, ValidationMetrics};
use crate::middleware::validation::{validate_request, ValidationState};

pub use crate::error::ApiError;

/// Put every route of `router` behind the validation hook.
///
/// # Panics
///
/// Like `Router::route_layer`, panics if `router` has no routes yet.
pub fn validated<S>(router: Router<S>, state: ValidationState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn_with_state(state, validate_request))
}

/// Compile `api` and assemble the stub server.
///
/// Every declared endpoint answers 200 with its method and route once
/// validation passes. Health probes and `/metrics` are mounted outside the
/// validation layer.
pub fn app(api: &ApiDescription, config: &ApiConfig) -> Result<Router, SchemaBuildError> {
    let cache = Arc::new(SchemaCache::build_all(api)?);
    let dispatcher = Dispatcher::new(Arc::clone(&cache)).with_malformed_body(config.malformed_body);
    let metrics = ValidationMetrics::new();
    let state = ValidationState::new(dispatcher)
        .with_body_limit(config.body_limit)
        .with_metrics(metrics.clone());

    let mut endpoints = Router::new();
    for (method, route, _) in cache.iter() {
        endpoints = endpoints.route(route, on(method_filter(method), stub));
    }
    if !cache.is_empty() {
        endpoints = validated(endpoints, state);
    }

    let counters = metrics.clone();
    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route(
            "/metrics",
            get(move || {
                let snapshot = counters.snapshot();
                async move { Json(snapshot) }
            }),
        );

    Ok(Router::new()
        .merge(ops)
        .merge(endpoints)
        .layer(from_fn(metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(Extension(metrics)))
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Options => MethodFilter::OPTIONS,
    }
}

/// Handler mounted for every declared endpoint.
async fn stub(method: Method, route: MatchedPath) -> Json<Value> {
    Json(json!({ "method": method.as_str(), "route": route.as_str() }))
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}
