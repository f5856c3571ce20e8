//! `RocksDB` storage layer for the Velora coin ledger.
//!
//! This crate provides persistent storage for accounts, coin transactions,
//! processed payments, and analytics events using `RocksDB` with column
//! families for indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: Primary account records, keyed by `user_id`
//! - `transactions`: Coin transactions, keyed by `transaction_id` (ULID)
//! - `transactions_by_user`: Index for listing transactions by user
//! - `processed_payments`: Settled payment IDs, for replay protection
//! - `analytics_events`: Best-effort analytics records
//!
//! # Atomicity
//!
//! A balance mutation and its audit record always land in one `WriteBatch`,
//! and every read-check-write sequence runs under a per-account lock, so two
//! concurrent charges against one account observe each other's effect.
//!
//! # Example
//!
//! ```no_run
//! use velora_store::{RocksStore, Store};
//! use velora_core::{Account, CoinTransaction, UserId};
//!
//! let store = RocksStore::open("/tmp/velora-db").unwrap();
//!
//! let user_id = UserId::generate();
//! store.put_account(&Account::new(user_id)).unwrap();
//!
//! let tx = CoinTransaction::spend(user_id, 3, "Recipe generation".into(), None);
//! let new_balance = store.charge_coins(&user_id, 3, &tx);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use velora_core::{Account, AnalyticsEvent, CoinTransaction, Subscription, TransactionId, UserId};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations behind the service.
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert or update an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Get an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>>;

    /// Delete an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_account(&self, user_id: &UserId) -> Result<()>;

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CoinTransaction>>;

    /// List transactions for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>>;

    // =========================================================================
    // Atomic Ledger Operations
    // =========================================================================

    /// Debit coins and record the transaction atomically.
    ///
    /// Returns the new balance after the debit. Serialized per account: a
    /// concurrent charge on the same account sees this charge's effect.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::InsufficientCoins` if the balance is too low; no
    ///   mutation occurs.
    fn charge_coins(
        &self,
        user_id: &UserId,
        amount: i64,
        transaction: &CoinTransaction,
    ) -> Result<i64>;

    /// Credit coins and record the transaction atomically.
    ///
    /// Returns the new balance after the credit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn grant_coins(
        &self,
        user_id: &UserId,
        amount: i64,
        transaction: &CoinTransaction,
    ) -> Result<i64>;

    /// Settle a verified subscription payment: update subscription state,
    /// credit the tier's coins, record the transaction, and mark the payment
    /// as processed, all in one atomic write.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::PaymentAlreadyProcessed` if this `payment_id` was
    ///   settled before; no mutation occurs.
    fn settle_subscription_payment(
        &self,
        user_id: &UserId,
        payment_id: &str,
        subscription: Subscription,
        transaction: &CoinTransaction,
    ) -> Result<i64>;

    /// Check whether a payment ID has already been settled.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn is_payment_processed(&self, payment_id: &str) -> Result<bool>;

    /// Reset the account's subscription to the free tier, keeping the
    /// remaining balance. No transaction record is written: cancellation
    /// changes no coins.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn clear_subscription(&self, user_id: &UserId) -> Result<()>;

    // =========================================================================
    // Analytics Operations
    // =========================================================================

    /// Append an analytics event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_analytics_event(&self, event: &AnalyticsEvent) -> Result<()>;

    /// List analytics events for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_analytics_events_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<AnalyticsEvent>>;
}
