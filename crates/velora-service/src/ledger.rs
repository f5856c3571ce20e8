//! The coin charge/grant engine.
//!
//! All balance mutations in the service go through [`CoinLedger`], which
//! validates amounts, builds the audit record, and delegates to the store's
//! atomic operations. A charge is never reversed here: if a downstream step
//! fails after a successful charge, the caller issues a compensating grant.

use std::sync::Arc;

use velora_core::{CoinTransaction, TransactionType, UserId};
use velora_store::{RocksStore, Store};

use crate::error::ApiError;

/// Atomic charge/grant operations over the ledger store.
#[derive(Clone)]
pub struct CoinLedger {
    store: Arc<RocksStore>,
}

impl CoinLedger {
    /// Create a ledger over the shared store.
    #[must_use]
    pub fn new(store: Arc<RocksStore>) -> Self {
        Self { store }
    }

    /// Debit `amount` coins. Fails closed: on insufficient balance nothing
    /// is written and the caller gets the structured failure.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `ApiError::BadRequest` if `amount` is not positive.
    /// - `ApiError::NotFound` if the account doesn't exist.
    /// - `ApiError::InsufficientCoins` if the balance can't cover the charge.
    pub fn charge(
        &self,
        user_id: UserId,
        amount: i64,
        description: String,
        related_entity_id: Option<String>,
    ) -> Result<i64, ApiError> {
        if amount <= 0 {
            return Err(ApiError::BadRequest("Amount must be positive".into()));
        }

        let tx = CoinTransaction::spend(user_id, amount, description, related_entity_id);
        let balance = self.store.charge_coins(&user_id, amount, &tx)?;

        tracing::info!(
            user_id = %user_id,
            amount = %amount,
            new_balance = %balance,
            transaction_id = %tx.id,
            "Coins charged"
        );

        Ok(balance)
    }

    /// Credit `amount` coins with the given credit type.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `ApiError::BadRequest` if `amount` is not positive or the type is
    ///   not a credit type.
    /// - `ApiError::NotFound` if the account doesn't exist.
    pub fn grant(
        &self,
        user_id: UserId,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        related_entity_id: Option<String>,
    ) -> Result<i64, ApiError> {
        if amount <= 0 {
            return Err(ApiError::BadRequest("Amount must be positive".into()));
        }
        if !transaction_type.is_credit() {
            return Err(ApiError::BadRequest(
                "Grant requires a credit transaction type".into(),
            ));
        }

        let tx = CoinTransaction::grant(
            user_id,
            amount,
            transaction_type,
            description,
            related_entity_id,
        );
        let balance = self.store.grant_coins(&user_id, amount, &tx)?;

        tracing::info!(
            user_id = %user_id,
            amount = %amount,
            transaction_type = ?transaction_type,
            new_balance = %balance,
            transaction_id = %tx.id,
            "Coins granted"
        );

        Ok(balance)
    }

    /// Shared access to the underlying store.
    #[must_use]
    pub fn store(&self) -> &RocksStore {
        &self.store
    }
}
