//! Velora HTTP API Service.
//!
//! This crate provides the HTTP API for the Velora coin ledger, including:
//!
//! - Account management
//! - Coin balance, charges, grants, and transaction history
//! - Rate-limited, coin-charged AI endpoints (chat, recipe generation)
//! - Payment order creation and callback verification
//!
//! # Authentication
//!
//! End-user requests carry a Bearer JWT from the identity provider,
//! validated against its JWKS. Payment callbacks are additionally verified
//! with an HMAC signature over the order/payment pair.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers stay async for route consistency

pub mod analytics;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod llm;
pub mod ratelimit;
pub mod razorpay;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use ledger::CoinLedger;
pub use llm::GeminiClient;
pub use ratelimit::{InMemoryRateLimitStore, RateLimitStore, RateLimiter};
pub use razorpay::RazorpayClient;
pub use routes::create_router;
pub use state::AppState;
