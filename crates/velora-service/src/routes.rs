//! Router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, ai, coins, health, payments};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for AI endpoints. Each request holds an
/// upstream LLM call open, so the cap is tight.
const AI_MAX_CONCURRENT_REQUESTS: usize = 25;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts
/// - `POST /v1/accounts` - Create/register account
/// - `GET /v1/accounts/me` - Get current user's account
/// - `DELETE /v1/accounts/me` - Delete current user's account
///
/// ## Coins
/// - `GET /v1/coins/balance` - Get current balance
/// - `GET /v1/coins/transactions` - List transaction history
/// - `POST /v1/coins/spend` - Charge coins
/// - `POST /v1/coins/grant` - Grant coins (refunds, rewards)
///
/// ## AI (rate-limited per user, charged per call)
/// - `POST /v1/ai/chat` - Chat message
/// - `POST /v1/ai/recipes` - Recipe generation
///
/// ## Payments & subscription
/// - `POST /v1/payments/orders` - Create a payment order upstream
/// - `POST /v1/payments/verify` - Verify a payment callback and settle
/// - `GET /v1/subscription` - Subscription status
/// - `DELETE /v1/subscription` - Cancel subscription
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // AI routes carry their own (tighter) concurrency limit; the per-user
    // rate limiter inside the handlers is a separate control.
    let ai_routes = Router::new()
        .route("/chat", post(ai::chat))
        .route("/recipes", post(ai::generate_recipe))
        .layer(ConcurrencyLimitLayer::new(AI_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/me", get(accounts::get_account))
        .route("/accounts/me", delete(accounts::delete_account))
        // Coins
        .route("/coins/balance", get(coins::get_balance))
        .route("/coins/transactions", get(coins::list_transactions))
        .route("/coins/spend", post(coins::spend_coins))
        .route("/coins/grant", post(coins::grant_coins))
        // Payments
        .route("/payments/orders", post(payments::create_order))
        .route("/payments/verify", post(payments::verify_payment))
        // Subscription
        .route("/subscription", get(payments::subscription_status))
        .route("/subscription", delete(payments::cancel_subscription))
        // AI routes (with their own concurrency limit)
        .nest("/ai", ai_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // API v1 routes
        .nest("/v1", api_routes)
        // Global middleware
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
