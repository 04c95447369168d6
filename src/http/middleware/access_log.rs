//! Access Log Middleware.
//! Logs every request on the way in and its status on the way out.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::request::request_id;
use crate::observability::metrics;

pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let request_id = request_id(request.headers()).to_string();

    // Header names only; values may carry credentials.
    let header_names: Vec<&str> = request.headers().keys().map(|k| k.as_str()).collect();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        headers = ?header_names,
        "[IN]"
    );

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "[OUT]"
    );
    metrics::record_request(method.as_str(), &route, status.as_u16(), start);

    response
}
