use std::sync::PoisonError;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::resilience::{BreakerSnapshot, BreakerState};
use crate::scheduler::SchedulerStatus;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub circuit_breaker: BreakerSnapshot,
    pub scheduler: Option<SchedulerStatus>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let breaker = state.invoker.breaker_snapshot();
    let status = match breaker.state {
        BreakerState::Closed => "operational",
        BreakerState::HalfOpen => "recovering",
        BreakerState::Open => "degraded",
    };
    let scheduler = state
        .scheduler_status
        .as_ref()
        .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).clone());

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status,
        circuit_breaker: breaker,
        scheduler,
    })
}
