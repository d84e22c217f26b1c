//! Handlers for the public routes.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::response::{
    ApiError, RecommendationResponse, RecommendedProduct, UserResponse,
};
use crate::http::server::AppState;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.users.get_user_by_id(&id) {
        Some(user) => Json(UserResponse { data: user }).into_response(),
        None => ApiError::not_found("User not found").into_response(),
    }
}

/// User details plus a recommended product fetched through the resilience guard.
pub async fn get_user_with_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(user) = state.users.get_user_by_id(&id) else {
        return ApiError::not_found(format!("User with ID {id} not found.")).into_response();
    };

    let recommended_product = match state.users.get_recommended_product().await {
        Ok(product) => RecommendedProduct::Product(product),
        Err(e) => {
            tracing::warn!(
                user_id = %id,
                component = "app-service",
                error = %e,
                circuit_open = e.is_circuit_open(),
                "Error fetching recommended product"
            );
            RecommendedProduct::unavailable()
        }
    };

    Json(RecommendationResponse {
        user,
        recommended_product,
    })
    .into_response()
}

pub async fn health() -> &'static str {
    "User Service is healthy!"
}

/// Render all counters and gauges in Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics are disabled").into_response(),
    }
}
