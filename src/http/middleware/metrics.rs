//! Request counting middleware.
//! Records `http_request_total` once the response status is known.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics::record_http_request;

/// Count every routed request by method, route template and status.
///
/// Installed with `route_layer`, so it only runs for matched routes and
/// unknown paths never create a label.
pub async fn request_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned());

    let response = next.run(request).await;
    if let Some(path) = path {
        record_http_request(&method, &path, response.status().as_u16());
    }
    response
}
