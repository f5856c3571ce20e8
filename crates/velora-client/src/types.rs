//! Request and response types for the Velora client.

use serde::{Deserialize, Serialize};

/// Account summary response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    /// User ID.
    pub user_id: String,
    /// Current coin balance.
    pub coin_balance: i64,
    /// Current subscription tier.
    pub subscription_tier: String,
    /// Whether the subscription period is still running.
    pub subscription_active: bool,
    /// Subscription end date, if any.
    #[serde(default)]
    pub subscription_end_date: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

/// Balance response.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    /// Current coin balance.
    pub balance: i64,
    /// Current subscription tier.
    pub tier: String,
}

/// A single transaction in history listings.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Signed coin amount.
    pub amount: i64,
    /// Transaction type.
    pub transaction_type: String,
    /// Description.
    pub description: String,
    /// Related entity, if any.
    #[serde(default)]
    pub related_entity_id: Option<String>,
    /// Timestamp.
    pub created_at: String,
}

/// Transaction history response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// Response to spend/grant operations.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMutationResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Balance after the operation.
    pub balance: i64,
}

/// Chat response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub message: String,
    /// Coins charged for this message.
    pub coin_cost: i64,
    /// Balance after the charge.
    pub balance: i64,
}

/// Recipe generation response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRecipeResponse {
    /// The generated recipe document.
    pub recipe: serde_json::Value,
    /// Coins charged for the generation.
    pub coin_cost: i64,
    /// Balance after the charge.
    pub balance: i64,
}

/// Order creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    /// Provider order ID.
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Public key ID for the checkout SDK.
    pub key_id: String,
}

/// Payment verification response.
#[derive(Debug, Clone, Deserialize)]
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

/// Subscription status response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionStatusResponse {
    /// Whether the subscription period is still running.
    pub active: bool,
    /// Current tier.
    pub tier: String,
    /// Period end, if a subscription exists.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A single conversation turn in chat requests.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// "user" or "assistant".
    pub role: String,
    /// The message text.
    pub text: String,
}

/// Error envelope returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
