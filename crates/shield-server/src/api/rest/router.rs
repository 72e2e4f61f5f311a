//! Router creation and configuration

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use shield_sdk::OrderProcessingService;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(service: Arc<OrderProcessingService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/health", get(health))
        .route("/api/pricing", get(pricing))
        .route("/api/quote", post(quote))
        .route("/api/investigate", post(investigate))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/create", post(create_order))
        .route("/api/orders/:id/status", get(order_status))
        .route("/api/orders/:id/confirm", post(confirm_payment))
        .route("/api/orders/:id/cancel", post(cancel_order))
        .route("/api/webhooks/:provider", post(payment_webhook))
        .route("/api/reports/:id/download/:format", get(download_report))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
