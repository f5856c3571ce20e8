//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary account records, keyed by `user_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Coin transactions, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by user, keyed by `user_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// Settled payments, keyed by `payment_id`. Presence means the payment
    /// has already granted coins and must not grant again.
    pub const PROCESSED_PAYMENTS: &str = "processed_payments";

    /// Analytics events, keyed by `user_id || event_id`.
    pub const ANALYTICS_EVENTS: &str = "analytics_events";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::PROCESSED_PAYMENTS,
        cf::ANALYTICS_EVENTS,
    ]
}
