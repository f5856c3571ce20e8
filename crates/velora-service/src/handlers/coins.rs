//! Coin balance and transaction handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use velora_core::{CoinTransaction, TransactionType};
use velora_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current coin balance.
    pub balance: i64,
    /// Current subscription tier.
    pub tier: String,
}

/// Get current coin balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(BalanceResponse {
        balance: account.coin_balance,
        tier: account.current_tier().to_string(),
    }))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Signed coin amount (positive = grant, negative = spend).
    pub amount: i64,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Description.
    pub description: String,
    /// Related entity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    /// Timestamp.
    pub created_at: String,
}

impl From<&CoinTransaction> for TransactionResponse {
    fn from(tx: &CoinTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            description: tx.description.clone(),
            related_entity_id: tx.related_entity_id.clone(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Verify account exists
    state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let transactions = state
        .store
        .list_transactions_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}

/// Spend coins request.
#[derive(Debug, Deserialize)]
pub struct SpendCoinsRequest {
    /// Coins to spend (positive).
    pub amount: i64,
    /// What the spend is for.
    pub description: String,
    /// Transaction type (defaults to `spent`).
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// Entity the spend relates to.
    #[serde(default)]
    pub related_entity_id: Option<String>,
}

/// Mutation response shared by spend and grant.
#[derive(Debug, Serialize)]
pub struct CoinMutationResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Balance after the operation.
    pub balance: i64,
}

/// Spend coins.
pub async fn spend_coins(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SpendCoinsRequest>,
) -> Result<Json<CoinMutationResponse>, ApiError> {
    if let Some(requested) = body.transaction_type {
        if !requested.is_debit() {
            return Err(ApiError::BadRequest(
                "Spend requires a debit transaction type".into(),
            ));
        }
    }

    let balance = state.ledger.charge(
        auth.user_id,
        body.amount,
        body.description,
        body.related_entity_id,
    )?;

    Ok(Json(CoinMutationResponse {
        success: true,
        balance,
    }))
}

/// Grant coins request.
#[derive(Debug, Deserialize)]
pub struct GrantCoinsRequest {
    /// Coins to grant (positive).
    pub amount: i64,
    /// What the grant is for.
    pub description: String,
    /// Transaction type (defaults to `earned`).
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// Entity the grant relates to.
    #[serde(default)]
    pub related_entity_id: Option<String>,
}

/// Grant coins (refunds, rewards).
pub async fn grant_coins(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<GrantCoinsRequest>,
) -> Result<Json<CoinMutationResponse>, ApiError> {
    let transaction_type = body.transaction_type.unwrap_or(TransactionType::Earned);

    let balance = state.ledger.grant(
        auth.user_id,
        body.amount,
        transaction_type,
        body.description,
        body.related_entity_id,
    )?;

    Ok(Json(CoinMutationResponse {
        success: true,
        balance,
    }))
}
