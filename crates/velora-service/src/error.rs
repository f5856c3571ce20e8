//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input, invalid signature, unknown tier.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Insufficient coins for a charge.
    #[error("insufficient coins: balance={balance}, required={required}")]
    InsufficientCoins {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Payment callback replayed an already-settled payment.
    #[error("payment already processed: {0}")]
    PaymentAlreadyProcessed(String),

    /// Too many requests in the current window.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error (payment provider, LLM provider).
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::InsufficientCoins { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_coins",
                "Insufficient coins".to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::PaymentAlreadyProcessed(id) => (
                StatusCode::CONFLICT,
                "payment_already_processed",
                format!("Payment {id} already processed"),
                None,
            ),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Rate limit exceeded. Please try again in a minute.".to_string(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<velora_store::StoreError> for ApiError {
    fn from(err: velora_store::StoreError) -> Self {
        match err {
            velora_store::StoreError::NotFound => Self::NotFound("Account not found".into()),
            velora_store::StoreError::InsufficientCoins { balance, required } => {
                Self::InsufficientCoins { balance, required }
            }
            velora_store::StoreError::PaymentAlreadyProcessed { payment_id } => {
                Self::PaymentAlreadyProcessed(payment_id)
            }
            velora_store::StoreError::Database(msg)
            | velora_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
