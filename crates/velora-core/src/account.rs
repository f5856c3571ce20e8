//! Account and subscription types for the Velora ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UserId;

// ============================================================================
// Constants
// ============================================================================

/// Free tier monthly coin allotment.
pub const FREE_TIER_COINS: i64 = 10;

/// Plus tier monthly coin allotment.
pub const PLUS_TIER_COINS: i64 = 50;

/// Pro tier monthly coin allotment.
pub const PRO_TIER_COINS: i64 = 150;

/// Ultra tier monthly coin allotment.
pub const ULTRA_TIER_COINS: i64 = 500;

/// Plus tier price in minor currency units (4.99).
pub const PLUS_TIER_PRICE_MINOR: i64 = 499;

/// Pro tier price in minor currency units (9.99).
pub const PRO_TIER_PRICE_MINOR: i64 = 999;

/// Ultra tier price in minor currency units (19.99).
pub const ULTRA_TIER_PRICE_MINOR: i64 = 1999;

/// A ledger account for a user.
///
/// The account owns the coin balance. The balance is mutated only through
/// the store's atomic charge/grant operations so every delta has a matching
/// transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The user ID (from the identity provider).
    pub user_id: UserId,

    /// Current coin balance. Invariant: never negative.
    pub coin_balance: i64,

    /// Current subscription, if any.
    pub subscription: Option<Subscription>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            coin_balance: 0,
            subscription: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the account can cover a charge.
    #[must_use]
    pub fn has_sufficient_coins(&self, amount: i64) -> bool {
        self.coin_balance >= amount
    }

    /// Get the current tier (Free when no subscription is attached).
    #[must_use]
    pub fn current_tier(&self) -> SubscriptionTier {
        self.subscription
            .as_ref()
            .map_or(SubscriptionTier::Free, |s| s.tier)
    }

    /// Check whether the subscription is still within its paid period.
    #[must_use]
    pub fn has_active_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|s| s.end_date > Utc::now())
    }
}

/// Subscription state attached to an account.
///
/// Mutated only by the payment verification flow on a validated callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// The subscription tier.
    pub tier: SubscriptionTier,

    /// Start of the current subscription period.
    pub start_date: DateTime<Utc>,

    /// End of the current subscription period.
    pub end_date: DateTime<Utc>,

    /// The provider payment ID that activated this subscription.
    pub payment_id: String,
}

/// Available subscription tiers.
///
/// The tier table is fixed at compile time: an unknown tier string is
/// rejected at the boundary rather than defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    /// Free tier: 10 coins/month, no payment.
    Free,

    /// Plus tier: 50 coins/month at 4.99.
    Plus,

    /// Pro tier: 150 coins/month at 9.99.
    Pro,

    /// Ultra tier: 500 coins/month at 19.99.
    Ultra,
}

impl SubscriptionTier {
    /// Monthly coin allotment for this tier.
    #[must_use]
    pub const fn monthly_coins(self) -> i64 {
        match self {
            Self::Free => FREE_TIER_COINS,
            Self::Plus => PLUS_TIER_COINS,
            Self::Pro => PRO_TIER_COINS,
            Self::Ultra => ULTRA_TIER_COINS,
        }
    }

    /// Monthly price in minor currency units.
    #[must_use]
    pub const fn price_minor_units(self) -> i64 {
        match self {
            Self::Free => 0,
            Self::Plus => PLUS_TIER_PRICE_MINOR,
            Self::Pro => PRO_TIER_PRICE_MINOR,
            Self::Ultra => ULTRA_TIER_PRICE_MINOR,
        }
    }

    /// Display name, capitalized ("Plus", "Pro", ...).
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Plus => "Plus",
            Self::Pro => "Pro",
            Self::Ultra => "Ultra",
        }
    }

    /// Wire name, lowercase ("plus", "pro", ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Plus => "plus",
            Self::Pro => "pro",
            Self::Ultra => "ultra",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "plus" => Ok(Self::Plus),
            "pro" => Ok(Self::Pro),
            "ultra" => Ok(Self::Ultra),
            other => Err(ParseTierError {
                tier: other.to_string(),
            }),
        }
    }
}

/// Error returned when a tier string does not name a known tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subscription tier: {tier}")]
pub struct ParseTierError {
    /// The rejected tier string.
    pub tier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_has_zero_balance() {
        let account = Account::new(UserId::generate());
        assert_eq!(account.coin_balance, 0);
        assert!(account.subscription.is_none());
        assert_eq!(account.current_tier(), SubscriptionTier::Free);
    }

    #[test]
    fn account_sufficient_coins() {
        let mut account = Account::new(UserId::generate());
        account.coin_balance = 10;

        assert!(account.has_sufficient_coins(5));
        assert!(account.has_sufficient_coins(10));
        assert!(!account.has_sufficient_coins(11));
    }

    #[test]
    fn expired_subscription_is_inactive() {
        let mut account = Account::new(UserId::generate());
        account.subscription = Some(Subscription {
            tier: SubscriptionTier::Plus,
            start_date: Utc::now() - chrono::Duration::days(60),
            end_date: Utc::now() - chrono::Duration::days(30),
            payment_id: "pay_expired".into(),
        });

        assert!(!account.has_active_subscription());
        // Tier is still reported; activity is a separate question.
        assert_eq!(account.current_tier(), SubscriptionTier::Plus);
    }

    #[test]
    fn tier_table() {
        assert_eq!(SubscriptionTier::Free.monthly_coins(), 10);
        assert_eq!(SubscriptionTier::Plus.monthly_coins(), 50);
        assert_eq!(SubscriptionTier::Pro.monthly_coins(), 150);
        assert_eq!(SubscriptionTier::Ultra.monthly_coins(), 500);

        assert_eq!(SubscriptionTier::Free.price_minor_units(), 0);
        assert_eq!(SubscriptionTier::Plus.price_minor_units(), 499);
        assert_eq!(SubscriptionTier::Pro.price_minor_units(), 999);
        assert_eq!(SubscriptionTier::Ultra.price_minor_units(), 1999);
    }

    #[test]
    fn tier_parsing() {
        assert_eq!("plus".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Plus));
        assert_eq!("ultra".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Ultra));
        assert!("platinum".parse::<SubscriptionTier>().is_err());
        // Case-sensitive on purpose: the wire format is lowercase.
        assert!("Plus".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn tier_serde_wire_format() {
        let json = serde_json::to_string(&SubscriptionTier::Ultra).unwrap();
        assert_eq!(json, "\"ultra\"");
        let tier: SubscriptionTier = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(tier, SubscriptionTier::Pro);
    }
}
