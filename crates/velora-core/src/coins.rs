//! Coin transaction types.
//!
//! Every balance change creates exactly one transaction record. Records are
//! append-only: they are never updated or deleted, and the full log for an
//! account reconciles to its balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SubscriptionTier, TransactionId, UserId};

/// An immutable record of a single balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Signed coin amount. Negative = spend, positive = grant.
    pub amount: i64,

    /// Type of transaction.
    pub transaction_type: TransactionType,

    /// Human-readable description.
    pub description: String,

    /// Entity this transaction relates to (payment ID, conversation ID, ...).
    pub related_entity_id: Option<String>,

    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
}

impl CoinTransaction {
    /// Create a spend record. The stored amount is always negative.
    #[must_use]
    pub fn spend(
        user_id: UserId,
        amount: i64,
        description: String,
        related_entity_id: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount: -amount.abs(),
            transaction_type: TransactionType::Spent,
            description,
            related_entity_id,
            created_at: Utc::now(),
        }
    }

    /// Create a grant record with an explicit type. The stored amount is
    /// always positive.
    #[must_use]
    pub fn grant(
        user_id: UserId,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        related_entity_id: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount: amount.abs(),
            transaction_type,
            description,
            related_entity_id,
            created_at: Utc::now(),
        }
    }

    /// Create the grant record for a verified subscription purchase.
    #[must_use]
    pub fn subscription_purchase(user_id: UserId, tier: SubscriptionTier, payment_id: &str) -> Self {
        Self::grant(
            user_id,
            tier.monthly_coins(),
            TransactionType::Subscription,
            format!("{} subscription purchase", tier.display_name()),
            Some(payment_id.to_string()),
        )
    }
}

/// Type of coin transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Coins credited outside a subscription (refunds, rewards).
    Earned,

    /// Coins debited for feature usage.
    Spent,

    /// Monthly subscription coin grant.
    Subscription,

    /// Promotional or welcome coins.
    Bonus,
}

impl TransactionType {
    /// Whether this type credits the balance.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Earned | Self::Subscription | Self::Bonus)
    }

    /// Whether this type debits the balance.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_amount_is_negative() {
        let tx = CoinTransaction::spend(UserId::generate(), 5, "Test purchase".into(), None);
        assert_eq!(tx.amount, -5);
        assert_eq!(tx.transaction_type, TransactionType::Spent);
    }

    #[test]
    fn grant_amount_is_positive() {
        let tx = CoinTransaction::grant(
            UserId::generate(),
            10,
            TransactionType::Earned,
            "Bonus coins".into(),
            None,
        );
        assert_eq!(tx.amount, 10);
        assert_eq!(tx.transaction_type, TransactionType::Earned);
    }

    #[test]
    fn subscription_purchase_record() {
        let tx = CoinTransaction::subscription_purchase(
            UserId::generate(),
            SubscriptionTier::Plus,
            "pay_123",
        );
        assert_eq!(tx.amount, 50);
        assert_eq!(tx.transaction_type, TransactionType::Subscription);
        assert_eq!(tx.description, "Plus subscription purchase");
        assert_eq!(tx.related_entity_id.as_deref(), Some("pay_123"));
    }

    #[test]
    fn transaction_type_credit_debit() {
        assert!(TransactionType::Earned.is_credit());
        assert!(TransactionType::Subscription.is_credit());
        assert!(TransactionType::Bonus.is_credit());
        assert!(!TransactionType::Spent.is_credit());

        assert!(TransactionType::Spent.is_debit());
        assert!(!TransactionType::Bonus.is_debit());
    }

    #[test]
    fn transaction_type_wire_format() {
        let json = serde_json::to_string(&TransactionType::Subscription).unwrap();
        assert_eq!(json, "\"subscription\"");
    }
}
