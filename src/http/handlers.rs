//! Route handlers.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::concat::{concat, validate_all};
use crate::events::Event;
use crate::http::request::request_id;
use crate::http::response::{bad_request, json_passthrough, not_found, upstream_unavailable};
use crate::http::server::AppState;
use crate::resilience::InvokeError;
use crate::upstream::Resource;

/// `GET /move`
pub async fn get_moves(State(state): State<AppState>, headers: HeaderMap) -> Response {
    fetch(&state, Resource::Moves, &headers).await
}

/// `GET /move/{id}`
pub async fn get_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    match id.parse::<u32>() {
        Ok(id) => fetch(&state, Resource::Move(id), &headers).await,
        Err(_) => not_found("Move not found"),
    }
}

async fn fetch(state: &AppState, resource: Resource, headers: &HeaderMap) -> Response {
    match state.invoker.invoke(resource, headers.get(AUTHORIZATION)).await {
        Ok(payload) => {
            tracing::debug!(
                request_id = request_id(headers),
                resource = %resource,
                bytes = payload.len(),
                "Upstream payload forwarded"
            );
            json_passthrough(payload)
        }
        Err(e) => {
            let reason = match &e {
                InvokeError::CircuitOpen => "circuit_open",
                InvokeError::Upstream(_) => "upstream_error",
            };
            tracing::warn!(
                request_id = request_id(headers),
                resource = %resource,
                reason,
                error = %e,
                "Responding 503"
            );
            upstream_unavailable()
        }
    }
}

/// `POST /concat/{p1}/{p2}/{p3}/{p4}/{p5}`
pub async fn concat_strings(
    State(state): State<AppState>,
    Path((p1, p2, p3, p4, p5)): Path<(String, String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let params = [p1, p2, p3, p4, p5];

    if let Err(rejected) = validate_all(&params) {
        tracing::warn!(
            request_id = request_id(&headers),
            position = rejected.position,
            reason = %rejected.reason,
            "Concat parameter rejected"
        );
        return bad_request(rejected.reason.client_message());
    }

    let result = concat(&params);
    state
        .bus
        .publish(Event::strings_concatenated(params.to_vec(), result.clone()));

    result.into_response()
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
