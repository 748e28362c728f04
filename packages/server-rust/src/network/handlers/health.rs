//! Health, liveness, and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::network::HealthState;

/// Detailed health as JSON.
///
/// Always 200; `state` tells "up but draining" apart from "ready". `items`
/// is `null` if the store cannot be read.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let items = state.store.len().await.ok();
    let budget = state.pipeline.budget();

    Json(json!({
        "state": state.drain.health(),
        "node_id": state.server_config.node_id,
        "items": items,
        "in_flight": state.drain.in_flight(),
        "operations": {
            "in_use": budget.in_use(),
            "limit": budget.limit(),
        },
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// 200 whenever the process answers.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// 200 only while `Ready`; 503 while starting, draining or stopped.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    match state.drain.health() {
        HealthState::Ready => StatusCode::OK,
        HealthState::Starting | HealthState::Draining | HealthState::Stopped => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
