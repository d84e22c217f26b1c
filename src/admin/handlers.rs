use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::resilience::CircuitSnapshot;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub dependency: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        dependency: state.users.invoker().dependency().to_string(),
    })
}

/// Current breaker state, counters and thresholds.
pub async fn get_circuit(State(state): State<AppState>) -> Json<CircuitSnapshot> {
    Json(state.users.invoker().breaker().snapshot())
}
