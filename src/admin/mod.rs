//! Operator endpoints for inspecting the running guard.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::{get_circuit, get_status};
use crate::http::server::AppState;

/// Routes under `/admin`, merged into the main router.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/circuit", get(get_circuit))
}
