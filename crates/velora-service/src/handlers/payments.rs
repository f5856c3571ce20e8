//! Payment order and verification handlers.
//!
//! Order creation has no ledger effect. Coins and subscription state move
//! only in `verify_payment`, after the callback signature checks out and the
//! payment ID passes replay protection.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{Months, Utc};
use serde::{Deserialize, Serialize};

use velora_core::{CoinTransaction, Subscription, SubscriptionTier};
use velora_store::Store;

use crate::analytics;
use crate::auth::AuthUser;
use crate::crypto::verify_payment_signature;
use crate::error::ApiError;
use crate::razorpay::{OrderRequest, RazorpayClient};
use crate::state::AppState;

/// Default currency for payment orders.
const DEFAULT_CURRENCY: &str = "INR";

/// Order creation request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code (defaults to INR).
    #[serde(default)]
    pub currency: Option<String>,
    /// Merchant receipt reference.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Free-form notes forwarded to the provider.
    #[serde(default)]
    pub notes: serde_json::Value,
}

/// Order creation response.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// Provider order ID, correlated with the later callback.
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Public key ID for the checkout SDK.
    pub key_id: String,
}

/// Create a payment order upstream.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    if body.amount <= 0 {
        return Err(ApiError::BadRequest("Invalid amount".into()));
    }

    let razorpay = require_razorpay(&state)?;

    let currency = body
        .currency
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let request = OrderRequest {
        amount: body.amount,
        currency,
        receipt: body.receipt,
        notes: body.notes,
    };

    let order = razorpay.create_order(&request).await.map_err(|e| {
        tracing::error!(user_id = %auth.user_id, error = %e, "Order creation failed");
        ApiError::ExternalService(e.to_string())
    })?;

    tracing::info!(
        user_id = %auth.user_id,
        order_id = %order.id,
        amount = %order.amount,
        "Payment order created"
    );

    Ok(Json(CreateOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: razorpay.key_id().to_string(),
    }))
}

/// Payment verification request, relayed by the client from the checkout.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    /// Provider order ID.
    pub order_id: String,
    /// Provider payment ID.
    pub payment_id: String,
    /// Provider signature over `order_id|payment_id`.
    pub signature: String,
    /// Purchased tier.
    pub tier: String,
}

/// Payment verification response.
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    /// Whether the payment verified and settled.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Balance after the subscription grant.
    pub coins: i64,
    /// Active subscription tier.
    pub subscription: String,
}

/// Verify a payment callback and settle the subscription purchase.
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    if body.order_id.is_empty() || body.payment_id.is_empty() || body.signature.is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    }

    let key_secret = state
        .config
        .razorpay_key_secret
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Payment provider not configured".into()))?;

    // Sole fraud barrier: the payload is client-relayed and untrusted until
    // the signature matches.
    if !verify_payment_signature(&body.order_id, &body.payment_id, &body.signature, key_secret) {
        tracing::warn!(
            user_id = %auth.user_id,
            order_id = %body.order_id,
            payment_id = %body.payment_id,
            "Invalid payment signature"
        );
        return Err(ApiError::BadRequest("Invalid payment signature".into()));
    }

    let tier: SubscriptionTier = body
        .tier
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid tier".into()))?;

    let start_date = Utc::now();
    let end_date = start_date
        .checked_add_months(Months::new(1))
        .ok_or_else(|| ApiError::Internal("Subscription end date overflow".into()))?;

    let subscription = Subscription {
        tier,
        start_date,
        end_date,
        payment_id: body.payment_id.clone(),
    };

    let transaction = CoinTransaction::subscription_purchase(auth.user_id, tier, &body.payment_id);
    let balance = state.store.settle_subscription_payment(
        &auth.user_id,
        &body.payment_id,
        subscription,
        &transaction,
    )?;

    tracing::info!(
        user_id = %auth.user_id,
        tier = %tier,
        payment_id = %body.payment_id,
        coins_granted = %tier.monthly_coins(),
        new_balance = %balance,
        "Payment verified and settled"
    );

    // Financial state is committed; analytics must not unwind it.
    analytics::record(
        state.store.as_ref(),
        auth.user_id,
        "subscription_purchase",
        serde_json::json!({
            "tier": tier.as_str(),
            "payment_id": body.payment_id,
            "order_id": body.order_id,
            "amount": tier.price_minor_units(),
            "coins_granted": tier.monthly_coins(),
        }),
    );

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message: "Payment verified and coins credited".into(),
        coins: balance,
        subscription: tier.to_string(),
    }))
}

/// Subscription status response.
#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    /// Whether the subscription period is still running.
    pub active: bool,
    /// Current tier.
    pub tier: String,
    /// Period end, if a subscription exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Get the current subscription status.
pub async fn subscription_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<SubscriptionStatusResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    let active = account.has_active_subscription();
    let tier = if active {
        account.current_tier()
    } else {
        SubscriptionTier::Free
    };

    Ok(Json(SubscriptionStatusResponse {
        active,
        tier: tier.to_string(),
        end_date: account
            .subscription
            .as_ref()
            .map(|s| s.end_date.to_rfc3339()),
    }))
}

/// Cancel the current subscription. Remaining coins are retained.
pub async fn cancel_subscription(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.clear_subscription(&auth.user_id)?;

    tracing::info!(user_id = %auth.user_id, "Subscription cancelled (coins retained)");

    Ok(Json(serde_json::json!({
        "success": true,
        "tier": SubscriptionTier::Free.as_str(),
    })))
}

fn require_razorpay(state: &AppState) -> Result<Arc<RazorpayClient>, ApiError> {
    state
        .razorpay
        .clone()
        .ok_or_else(|| ApiError::ExternalService("Payment provider not configured".into()))
}
