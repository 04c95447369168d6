//! Operator endpoints.

pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::get_status;

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/admin/status", get(get_status))
}
