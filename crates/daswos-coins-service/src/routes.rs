//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{coins, health, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /v1/coins/supply` - Supply ledger (advisory ceiling)
///
/// ## Coins (user bearer auth)
/// - `GET /v1/coins/balance` - Get current balance
/// - `GET /v1/coins/transactions` - List transaction history
/// - `POST /v1/coins/purchase` - Initiate coin purchase (checkout session)
/// - `POST /v1/coins/transfer` - Transfer coins to another user
///
/// ## Admin (API key auth)
/// - `POST /v1/coins/give` - Grant coins with no payment
///
/// ## Webhooks (signature verification)
/// - `POST /webhooks/stripe` - Stripe webhooks (the only crediting path)
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Coins
        .route("/v1/coins/balance", get(coins::get_balance))
        .route("/v1/coins/transactions", get(coins::list_transactions))
        .route("/v1/coins/supply", get(coins::get_supply))
        .route("/v1/coins/purchase", post(coins::purchase_coins))
        .route("/v1/coins/transfer", post(coins::transfer_coins))
        .route("/v1/coins/give", post(coins::give_coins))
        // Webhooks
        .route("/webhooks/stripe", post(webhooks::stripe_webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
