//! Error responses.
//!
//! # Design Decisions
//! - Upstream failures map to 503 with a generic JSON body; the cause is
//!   logged, never returned
//! - Validation failures map to 400 with a plain-text message

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Body returned for every upstream failure.
pub const UPSTREAM_ERROR_MESSAGE: &str = "External service unavailable";

pub fn upstream_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": UPSTREAM_ERROR_MESSAGE })),
    )
        .into_response()
}

pub fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

pub fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

/// Upstream payload passed through untouched as JSON.
pub fn json_passthrough(payload: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        payload,
    )
        .into_response()
}
