//! Response bodies.
//!
//! # Responsibilities
//! - Shape JSON bodies for the `/users` routes
//! - Map lookup misses to 404 with a message body
//!
//! # Design Decisions
//! - A failed recommendation is not an HTTP error: the user is still returned,
//!   with an error object in place of the product

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::upstream::Product;
use crate::users::User;

/// Body of `GET /users/{id}`.
#[derive(Debug, Serialize)]
pub struct UserResponse<'a> {
    pub data: &'a User,
}

/// Fallback placed where the product would be.
pub const RECOMMENDATION_UNAVAILABLE: &str = "Could not fetch recommendation";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendedProduct {
    Product(Product),
    Unavailable { error: &'static str },
}

impl RecommendedProduct {
    pub fn unavailable() -> Self {
        RecommendedProduct::Unavailable {
            error: RECOMMENDATION_UNAVAILABLE,
        }
    }
}

/// Body of `GET /users/{id}/recommendation`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse<'a> {
    pub user: &'a User,
    pub recommended_product: RecommendedProduct,
}

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: &'a str,
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            message: &self.message,
            error: self.status.canonical_reason().unwrap_or("Error"),
        };
        (self.status, Json(body)).into_response()
    }
}
