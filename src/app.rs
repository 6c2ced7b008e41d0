use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{api, health_check, metrics_handler};
use crate::observability::{observability_middleware, Metrics};
use crate::services::MenuService;

/// Build the application router
pub fn create_app(menu_service: Arc<MenuService>, metrics: Arc<Metrics>) -> Router {
    let metrics_for_middleware = metrics.clone();

    let api_state = api::ApiState { menu_service };

    Router::new()
        // Health and metrics endpoints (with metrics state)
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        // Menu endpoints; `/:selector` only answers `messtype=<MessType>` segments
        .route("/", get(api::root))
        .route("/:selector", get(api::get_menu))
        .route("/:selector/", get(api::get_menu))
        .with_state(api_state)
        .fallback(api::not_found)
        // Outer to inner: observability sees the final status, CORS decorates every response
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}
