//! # Validation Metrics
//!
//! In-process atomic counters. The validation middleware records one
//! verdict per request it sees; [`metrics_middleware`] counts every request
//! and error response. A snapshot is served as JSON at `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};

/// What the validation hook did with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Rejected,
    /// No schemas declared for the matched route.
    Skipped,
    /// Body over the configured limit.
    TooLarge,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    passed: AtomicU64,
    rejected: AtomicU64,
    skipped: AtomicU64,
    too_large: AtomicU64,
}

/// Shared metrics state. Cloning shares the counters.
#[derive(Debug, Clone, Default)]
pub struct ValidationMetrics {
    counters: Arc<Counters>,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub passed: u64,
    pub rejected: u64,
    pub skipped: u64,
    pub too_large: u64,
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, verdict: Verdict) {
        let counter = match verdict {
            Verdict::Passed => &self.counters.passed,
            Verdict::Rejected => &self.counters.rejected,
            Verdict::Skipped => &self.counters.skipped,
            Verdict::TooLarge => &self.counters.too_large,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.counters;
        MetricsSnapshot {
            requests: c.requests.load(Ordering::Relaxed),
            errors: c.errors.load(Ordering::Relaxed),
            passed: c.passed.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            skipped: c.skipped.load(Ordering::Relaxed),
            too_large: c.too_large.load(Ordering::Relaxed),
        }
    }
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ValidationMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.counters.requests.fetch_add(1, Ordering::Relaxed);
        if response.status().is_client_error() || response.status().is_server_error() {
            m.counters.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}
