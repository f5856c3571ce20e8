//! Razorpay API types.

use serde::{Deserialize, Serialize};

/// Order creation request body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Amount in minor currency units (e.g. paise).
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Merchant receipt reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// Free-form notes attached to the order.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub notes: serde_json::Value,
}

/// A payment order created upstream.
///
/// Transient: the service keeps nothing beyond what the response carries;
/// the order ID is correlated with the later verification callback.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    /// Provider order ID (`order_...`).
    pub id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Merchant receipt reference.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Order status (`created`, `attempted`, `paid`).
    #[serde(default)]
    pub status: Option<String>,
    /// Created timestamp (Unix).
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Provider error response body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorDetail,
}

/// Provider error detail.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    /// Provider error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}
