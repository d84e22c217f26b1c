//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, request metrics)
//! - Build the users service and its resilience guard from config
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::middleware::request_metrics_middleware;
use crate::http::request::{request_id_of, UuidRequestId};
use crate::upstream::FetchError;
use crate::users::UsersService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UsersService>,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the user service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    users: Arc<UsersService>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// `metrics` renders `/metrics`; without it the endpoint answers 404.
    pub fn new(config: ServiceConfig, metrics: Option<PrometheusHandle>) -> Result<Self, FetchError> {
        let users = Arc::new(UsersService::from_config(&config)?);
        let state = AppState {
            users: users.clone(),
            metrics,
        };
        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            users,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/users/{id}", get(handlers::get_user))
            .route(
                "/users/{id}/recommendation",
                get(handlers::get_user_with_recommendation),
            )
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::metrics))
            .merge(admin::admin_router())
            .route_layer(middleware::from_fn(request_metrics_middleware))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = request_id_of(request).unwrap_or("unknown"),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            dependency = %self.users.invoker().dependency(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn users(&self) -> &Arc<UsersService> {
        &self.users
    }
}
