//! Account management handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use velora_core::{Account, SubscriptionTier, TransactionType};
use velora_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id.to_string(),
            coin_balance: account.coin_balance,
            subscription_tier: account.current_tier().to_string(),
            subscription_active: account.has_active_subscription(),
            subscription_end_date: account
                .subscription
                .as_ref()
                .map(|s| s.end_date.to_rfc3339()),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Create account request (optional fields for metadata).
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Optional email (may be synced from the identity provider later).
    pub email: Option<String>,
}

/// Create or register a new account.
///
/// New accounts receive the Free tier's monthly allotment once, as a bonus
/// grant, so the starting balance has an audit-trail origin.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    if state.store.get_account(&auth.user_id)?.is_some() {
        return Err(ApiError::Conflict("Account already exists".into()));
    }

    let account = Account::new(auth.user_id);
    state.store.put_account(&account)?;

    state.ledger.grant(
        auth.user_id,
        SubscriptionTier::Free.monthly_coins(),
        TransactionType::Bonus,
        "Welcome bonus".into(),
        None,
    )?;

    tracing::info!(user_id = %auth.user_id, email = ?body.email, "Account created");

    let account = state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::Internal("Account vanished after creation".into()))?;

    Ok(Json(AccountResponse::from(&account)))
}

/// Get the current user's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(AccountResponse::from(&account)))
}

/// Delete the current user's account.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_account(&auth.user_id)?;

    tracing::info!(user_id = %auth.user_id, "Account deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
