//! Core types for the Velora coin ledger.
//!
//! This crate provides the foundational types shared by the ledger store,
//! the HTTP service, and the client SDK:
//!
//! - **Identifiers**: `UserId`, `TransactionId`
//! - **Accounts**: `Account`, `Subscription`, `SubscriptionTier`
//! - **Coins**: `CoinTransaction`, `TransactionType`
//! - **Analytics**: `AnalyticsEvent`
//!
//! # Coins
//!
//! Coins are whole units stored as `i64`. Every balance change is recorded
//! as a signed transaction amount: negative for spends, positive for grants.
//! The balance on the account is the source of truth; the transaction log is
//! the audit trail from which it can be reconciled.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod analytics;
pub mod coins;
pub mod ids;

pub use account::{
    Account, ParseTierError, Subscription, SubscriptionTier, FREE_TIER_COINS, PLUS_TIER_COINS,
    PLUS_TIER_PRICE_MINOR, PRO_TIER_COINS, PRO_TIER_PRICE_MINOR, ULTRA_TIER_COINS,
    ULTRA_TIER_PRICE_MINOR,
};
pub use analytics::AnalyticsEvent;
pub use coins::{CoinTransaction, TransactionType};
pub use ids::{IdError, TransactionId, UserId};
