//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_attempts_total` (counter): upstream round trips by result
//! - `gateway_retries_total` (counter): retry waits taken
//! - `gateway_breaker_transitions_total` (counter): state changes by breaker, from, to
//! - `gateway_breaker_rejections_total` (counter): calls refused while open
//! - `gateway_scheduler_ticks_total` (counter): scheduled ticks by result
//! - `gateway_events_published_total` (counter): events by kind
//! - `gateway_listener_failures_total` (counter): listener errors by listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_attempt(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("gateway_upstream_attempts_total", "result" => result).increment(1);
}

pub fn record_retry() {
    counter!("gateway_retries_total").increment(1);
}

pub fn record_breaker_transition(breaker: &str, from: &'static str, to: &'static str) {
    counter!(
        "gateway_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from,
        "to" => to
    )
    .increment(1);
}

pub fn record_breaker_rejection(breaker: &str) {
    counter!("gateway_breaker_rejections_total", "breaker" => breaker.to_string()).increment(1);
}

pub fn record_scheduler_tick(result: &'static str) {
    counter!("gateway_scheduler_ticks_total", "result" => result).increment(1);
}

pub fn record_event_published(kind: &'static str) {
    counter!("gateway_events_published_total", "kind" => kind).increment(1);
}

pub fn record_listener_failure(listener: &str) {
    counter!("gateway_listener_failures_total", "listener" => listener.to_string()).increment(1);
}
