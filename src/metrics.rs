use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
#[cfg(target_os = "linux")]
use prometheus::process_collector::ProcessCollector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::{http_server::AppState, store::StoreResult};

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    )
    .expect("valid http_requests_total definition");
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request duration in seconds").buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0
        ]),
        &["method", "endpoint"]
    )
    .expect("valid http_request_duration_seconds definition");
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGauge = IntGauge::new(
        "http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    )
    .expect("valid http_requests_in_flight definition");
    pub static ref HTTP_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_errors_total", "Total number of HTTP errors"),
        &["method", "endpoint", "status"]
    )
    .expect("valid http_errors_total definition");

    // Record store metrics
    pub static ref STORE_CALLS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("store_calls_total", "Total number of record store calls"),
        &["table", "operation"]
    )
    .expect("valid store_calls_total definition");
    pub static ref STORE_CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("store_call_duration_seconds", "Record store call duration in seconds")
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["table", "operation"]
    )
    .expect("valid store_call_duration_seconds definition");
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("store_errors_total", "Total number of failed record store calls"),
        &["table", "operation"]
    )
    .expect("valid store_errors_total definition");

    // Coupon lifecycle
    pub static ref COUPON_EVENTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("coupon_events_total", "Coupon lifecycle transitions"),
        &["event"]
    )
    .expect("valid coupon_events_total definition");
}

#[derive(Debug, Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        {
            let process_collector = ProcessCollector::for_self();
            registry
                .register(Box::new(process_collector))
                .expect("process collector registers once per registry");
        }

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(HTTP_REQUESTS_TOTAL.clone()),
            Box::new(HTTP_REQUEST_DURATION.clone()),
            Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
            Box::new(HTTP_ERRORS_TOTAL.clone()),
            Box::new(STORE_CALLS_TOTAL.clone()),
            Box::new(STORE_CALL_DURATION.clone()),
            Box::new(STORE_ERRORS_TOTAL.clone()),
            Box::new(COUPON_EVENTS_TOTAL.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .expect("metric registers once per registry");
        }

        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Collapses ids and codes in a path so endpoints keep a low label cardinality.
/// Example: /api/coupons/5c1d.../redeem -> api/coupons/:id/redeem
pub fn normalize_path(path: &str) -> String {
    let path_only = path.split('?').next().unwrap_or(path);

    path_only
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let is_code = s.len() >= 6 && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
            if s.parse::<i64>().is_ok() || s.len() == 36 || is_code {
                ":id"
            } else {
                s
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware for tracking HTTP metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if path == "/metrics" {
        return next.run(req).await;
    }

    let endpoint = normalize_path(&path);

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let start = Instant::now();

    let response = next.run(req).await;

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), &endpoint])
        .observe(start.elapsed().as_secs_f64());

    let status = response.status();
    let status_str = status.as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &endpoint, &status_str])
        .inc();

    if status.is_client_error() || status.is_server_error() {
        HTTP_ERRORS_TOTAL
            .with_label_values(&[method.as_str(), &endpoint, &status_str])
            .inc();
    }

    HTTP_REQUESTS_IN_FLIGHT.dec();

    response
}

/// Times one record store call and counts it, plus its failure if any.
pub async fn track_store_call<T, F>(table: &str, operation: &str, f: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let start = Instant::now();
    STORE_CALLS_TOTAL.with_label_values(&[table, operation]).inc();

    let result = f.await;

    STORE_CALL_DURATION
        .with_label_values(&[table, operation])
        .observe(start.elapsed().as_secs_f64());

    if result.is_err() {
        STORE_ERRORS_TOTAL.with_label_values(&[table, operation]).inc();
    }

    result
}

pub fn record_coupon_event(event: &str) {
    COUPON_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response();
    }

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
