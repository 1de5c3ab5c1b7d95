//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, backend calls)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track per-route and per-RPC figures
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): latency by method, route
//! - `gateway_backend_calls_total` (counter): backend calls by rpc, gRPC code
//! - `gateway_backend_call_duration_seconds` (histogram): backend latency by rpc
//!
//! # Design Decisions
//! - Routes are labelled by their template (`/v1/user/{id}`), never the raw path
//! - Recording without an installed recorder is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Label used for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, started: Instant) {
    let method = method.to_string();
    let route = route.to_string();

    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record one backend RPC and the code it finished with.
pub fn record_backend_call(rpc: &'static str, code: tonic::Code, started: Instant) {
    metrics::counter!(
        "gateway_backend_calls_total",
        "rpc" => rpc,
        "code" => format!("{:?}", code)
    )
    .increment(1);

    metrics::histogram!("gateway_backend_call_duration_seconds", "rpc" => rpc)
        .record(started.elapsed().as_secs_f64());
}

/// Middleware recording request count and latency per matched route.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), started);

    response
}
