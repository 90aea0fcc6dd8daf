//! # Request Validation Middleware
//!
//! Runs the [`Dispatcher`] before the handler. Must be installed with
//! `Router::route_layer` so the matched route template and path parameters
//! are available.
//!
//! For a route with declared schemas the body is buffered (up to the
//! configured limit), checked together with the path and query, and then
//! handed to the handler unchanged. A rejection answers 400 with
//! `{"details": {...}}` and the handler never runs. Routes with nothing
//! declared are forwarded without touching the body.

use axum::body::Body;
use axum::extract::{FromRequestParts, MatchedPath, RawPathParams, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use reqguard_core::HttpMethod;
use reqguard_schema::{Dispatcher, Outcome, RequestParts};

use crate::config::DEFAULT_BODY_LIMIT;
use crate::error::ApiError;
use crate::middleware::metrics::{ValidationMetrics, Verdict};

/// State for [`validate_request`].
#[derive(Debug, Clone)]
pub struct ValidationState {
    pub dispatcher: Dispatcher,
    pub body_limit: usize,
    pub metrics: ValidationMetrics,
}

impl ValidationState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            body_limit: DEFAULT_BODY_LIMIT,
            metrics: ValidationMetrics::new(),
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn with_metrics(mut self, metrics: ValidationMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

pub async fn validate_request(
    State(state): State<ValidationState>,
    request: Request,
    next: Next,
) -> Response {
    let Some((method, route)) = declared_route(&state, &request) else {
        state.metrics.record(Verdict::Skipped);
        return next.run(request).await;
    };

    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let err = err.into_inner();
            if err.is::<LengthLimitError>() {
                state.metrics.record(Verdict::TooLarge);
                return ApiError::PayloadTooLarge {
                    limit: state.body_limit,
                }
                .into_response();
            }
            return ApiError::BadRequest(format!("failed to read request body: {err}"))
                .into_response();
        }
    };

    let params = path_params(&mut parts).await;
    let borrowed: Vec<(&str, &str)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    let outcome = state.dispatcher.check(&RequestParts {
        method,
        route: &route,
        path_params: &borrowed,
        query: parts.uri.query(),
        body: &bytes,
    });

    match outcome {
        Outcome::Pass => {
            state.metrics.record(Verdict::Passed);
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Outcome::Reject(details) => {
            state.metrics.record(Verdict::Rejected);
            ApiError::Validation(details).into_response()
        }
    }
}

/// Method and matched template, when the route has declared schemas.
///
/// Axum answers `HEAD` with the `GET` handler, so a `HEAD` request with no
/// declaration of its own is checked against the `GET` declaration.
fn declared_route(state: &ValidationState, request: &Request) -> Option<(HttpMethod, String)> {
    let method: HttpMethod = request.method().as_str().parse().ok()?;
    let route = request.extensions().get::<MatchedPath>()?.as_str();
    let cache = state.dispatcher.cache();
    let method = match (cache.lookup(method, route), method) {
        (Some(_), method) => method,
        (None, HttpMethod::Head) => {
            cache.lookup(HttpMethod::Get, route)?;
            HttpMethod::Get
        }
        (None, _) => return None,
    };
    Some((method, route.to_string()))
}

async fn path_params(parts: &mut Parts) -> Vec<(String, String)> {
    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "no path parameters available");
            Vec::new()
        }
    }
}
