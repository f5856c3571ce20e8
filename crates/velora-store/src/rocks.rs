//! `RocksDB` storage implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use velora_core::{Account, AnalyticsEvent, CoinTransaction, Subscription, TransactionId, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
///
/// Multi-key writes go through a single `WriteBatch`. On top of that, every
/// read-check-write sequence holds a per-account lock for its duration, so
/// concurrent ledger operations on one account serialize while operations on
/// different accounts proceed in parallel.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    account_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            account_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Get (or create) the lock guarding one account's read-check-write.
    fn account_lock(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self
            .account_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(*user_id).or_default().clone()
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Stage an account write into a batch.
    fn stage_account(&self, batch: &mut WriteBatch, account: &Account) -> Result<()> {
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.user_id);
        let value = Self::serialize(account)?;
        batch.put_cf(&cf_accounts, key, value);
        Ok(())
    }

    /// Stage a transaction record plus its user-index entry into a batch.
    fn stage_transaction(&self, batch: &mut WriteBatch, transaction: &CoinTransaction) -> Result<()> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let tx_key = keys::transaction_key(&transaction.id);
        let user_tx_key = keys::user_transaction_key(&transaction.user_id, &transaction.id);
        let value = Self::serialize(transaction)?;

        batch.put_cf(&cf_tx, tx_key, value);
        batch.put_cf(&cf_by_user, user_tx_key, []);
        Ok(())
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn put_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.user_id);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn delete_account(&self, user_id: &UserId) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        if self.get_account(user_id)?.is_none() {
            return Err(StoreError::NotFound);
        }

        self.db
            .delete_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CoinTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // ULID keys iterate oldest-first; collect the prefix range and
        // reverse for newest-first listing.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut transactions = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if transactions.len() >= limit {
                break;
            }
            let tx_id = keys::extract_transaction_id_from_user_key(&key);
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Atomic Ledger Operations
    // =========================================================================

    fn charge_coins(
        &self,
        user_id: &UserId,
        amount: i64,
        transaction: &CoinTransaction,
    ) -> Result<i64> {
        let lock = self.account_lock(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        if account.coin_balance < amount {
            return Err(StoreError::InsufficientCoins {
                balance: account.coin_balance,
                required: amount,
            });
        }

        account.coin_balance -= amount;
        account.updated_at = chrono::Utc::now();

        let mut batch = WriteBatch::default();
        self.stage_account(&mut batch, &account)?;
        self.stage_transaction(&mut batch, transaction)?;
        self.write(batch)?;

        tracing::debug!(
            user_id = %user_id,
            amount = %amount,
            new_balance = %account.coin_balance,
            transaction_id = %transaction.id,
            "Charge committed"
        );

        Ok(account.coin_balance)
    }

    fn grant_coins(
        &self,
        user_id: &UserId,
        amount: i64,
        transaction: &CoinTransaction,
    ) -> Result<i64> {
        let lock = self.account_lock(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        account.coin_balance += amount;
        account.updated_at = chrono::Utc::now();

        let mut batch = WriteBatch::default();
        self.stage_account(&mut batch, &account)?;
        self.stage_transaction(&mut batch, transaction)?;
        self.write(batch)?;

        tracing::debug!(
            user_id = %user_id,
            amount = %amount,
            new_balance = %account.coin_balance,
            transaction_id = %transaction.id,
            "Grant committed"
        );

        Ok(account.coin_balance)
    }

    fn settle_subscription_payment(
        &self,
        user_id: &UserId,
        payment_id: &str,
        subscription: Subscription,
        transaction: &CoinTransaction,
    ) -> Result<i64> {
        let lock = self.account_lock(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Replay check inside the critical section: a duplicate callback
        // racing this one will observe the marker written below.
        if self.is_payment_processed(payment_id)? {
            return Err(StoreError::PaymentAlreadyProcessed {
                payment_id: payment_id.to_string(),
            });
        }

        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        account.coin_balance += transaction.amount;
        account.subscription = Some(subscription);
        account.updated_at = chrono::Utc::now();

        let cf_processed = self.cf(cf::PROCESSED_PAYMENTS)?;
        let mut batch = WriteBatch::default();
        self.stage_account(&mut batch, &account)?;
        self.stage_transaction(&mut batch, transaction)?;
        // The marker carries the transaction ID for reconciliation.
        batch.put_cf(
            &cf_processed,
            keys::processed_payment_key(payment_id),
            transaction.id.to_string().as_bytes(),
        );
        self.write(batch)?;

        tracing::debug!(
            user_id = %user_id,
            payment_id = %payment_id,
            new_balance = %account.coin_balance,
            "Subscription payment settled"
        );

        Ok(account.coin_balance)
    }

    fn is_payment_processed(&self, payment_id: &str) -> Result<bool> {
        let cf = self.cf(cf::PROCESSED_PAYMENTS)?;
        let key = keys::processed_payment_key(payment_id);

        let exists = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        Ok(exists)
    }

    fn clear_subscription(&self, user_id: &UserId) -> Result<()> {
        let lock = self.account_lock(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        account.subscription = None;
        account.updated_at = chrono::Utc::now();

        self.put_account(&account)
    }

    // =========================================================================
    // Analytics Operations
    // =========================================================================

    fn put_analytics_event(&self, event: &AnalyticsEvent) -> Result<()> {
        let cf = self.cf(cf::ANALYTICS_EVENTS)?;
        let key = keys::analytics_event_key(&event.user_id, &event.id);
        let value = Self::serialize(event)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_analytics_events_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<AnalyticsEvent>> {
        let cf = self.cf(cf::ANALYTICS_EVENTS)?;
        let prefix = keys::user_prefix(user_id);

        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, rocksdb::Direction::Forward));

        let mut values: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            values.push(value.to_vec());
        }
        values.reverse();

        values
            .iter()
            .take(limit)
            .map(|data| Self::deserialize(data))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;
    use velora_core::{SubscriptionTier, TransactionType};

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn create_account_with_balance(store: &RocksStore, balance: i64) -> UserId {
        let user_id = UserId::generate();
        let mut account = Account::new(user_id);
        account.coin_balance = balance;
        store.put_account(&account).unwrap();
        user_id
    }

    fn subscription(tier: SubscriptionTier, payment_id: &str) -> Subscription {
        Subscription {
            tier,
            start_date: Utc::now(),
            end_date: Utc::now() + chrono::Duration::days(30),
            payment_id: payment_id.to_string(),
        }
    }

    #[test]
    fn account_crud() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 25);

        let retrieved = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.coin_balance, 25);

        store.delete_account(&user_id).unwrap();
        assert!(store.get_account(&user_id).unwrap().is_none());
        assert!(matches!(
            store.delete_account(&user_id),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn charge_debits_and_records() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 10);

        let tx = CoinTransaction::spend(user_id, 5, "Test purchase".into(), None);
        let balance = store.charge_coins(&user_id, 5, &tx).unwrap();
        assert_eq!(balance, 5);

        let transactions = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, -5);
        assert_eq!(transactions[0].transaction_type, TransactionType::Spent);
    }

    #[test]
    fn insufficient_coins_leaves_state_untouched() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 2);

        let tx = CoinTransaction::spend(user_id, 5, "Test purchase".into(), None);
        let result = store.charge_coins(&user_id, 5, &tx);

        assert!(matches!(
            result,
            Err(StoreError::InsufficientCoins {
                balance: 2,
                required: 5
            })
        ));

        let account = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.coin_balance, 2);
        assert!(store
            .list_transactions_by_user(&user_id, 10, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn charge_on_missing_account_fails() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let tx = CoinTransaction::spend(user_id, 1, "Chat message".into(), None);
        assert!(matches!(
            store.charge_coins(&user_id, 1, &tx),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn grants_append_one_record_each() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 0);

        let tx1 = CoinTransaction::grant(
            user_id,
            10,
            TransactionType::Bonus,
            "Welcome bonus".into(),
            None,
        );
        store.grant_coins(&user_id, 10, &tx1).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2)); // Distinct ULID timestamps

        let tx2 = CoinTransaction::grant(
            user_id,
            10,
            TransactionType::Bonus,
            "Welcome bonus".into(),
            None,
        );
        let balance = store.grant_coins(&user_id, 10, &tx2).unwrap();

        assert_eq!(balance, 20);
        let transactions = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_ne!(transactions[0].id, transactions[1].id);
    }

    #[test]
    fn listing_is_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 100);

        for i in 1..=3 {
            let tx = CoinTransaction::spend(user_id, i, format!("Spend {i}"), None);
            store.charge_coins(&user_id, i, &tx).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let all = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].description, "Spend 3");
        assert_eq!(all[2].description, "Spend 1");

        let page2 = store.list_transactions_by_user(&user_id, 1, 1).unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].description, "Spend 2");
    }

    #[test]
    fn balance_reconciles_with_transaction_log() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 0);

        let grant = CoinTransaction::grant(
            user_id,
            50,
            TransactionType::Subscription,
            "Plus subscription purchase".into(),
            None,
        );
        store.grant_coins(&user_id, 50, &grant).unwrap();

        for amount in [1, 3, 1] {
            let tx = CoinTransaction::spend(user_id, amount, "AI usage".into(), None);
            store.charge_coins(&user_id, amount, &tx).unwrap();
        }

        let refund = CoinTransaction::grant(
            user_id,
            3,
            TransactionType::Earned,
            "Refund: Recipe generation failed".into(),
            None,
        );
        store.grant_coins(&user_id, 3, &refund).unwrap();

        let account = store.get_account(&user_id).unwrap().unwrap();
        let log_sum: i64 = store
            .list_transactions_by_user(&user_id, 100, 0)
            .unwrap()
            .iter()
            .map(|tx| tx.amount)
            .sum();

        assert_eq!(account.coin_balance, 48);
        assert_eq!(log_sum, account.coin_balance);
    }

    #[test]
    fn concurrent_charges_never_overdraw() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);

        const THREADS: i64 = 8;
        let user_id = create_account_with_balance(&store, THREADS - 1);

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let tx = CoinTransaction::spend(user_id, 1, "Chat message".into(), None);
                    store.charge_coins(&user_id, 1, &tx)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let rejections = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::InsufficientCoins { .. })))
            .count();

        assert_eq!(successes as i64, THREADS - 1);
        assert_eq!(rejections, 1);

        let account = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.coin_balance, 0);
        assert_eq!(
            store
                .list_transactions_by_user(&user_id, 100, 0)
                .unwrap()
                .len() as i64,
            THREADS - 1
        );
    }

    #[test]
    fn settle_payment_updates_subscription_and_balance() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 4);

        let tx = CoinTransaction::subscription_purchase(user_id, SubscriptionTier::Plus, "pay_1");
        let balance = store
            .settle_subscription_payment(
                &user_id,
                "pay_1",
                subscription(SubscriptionTier::Plus, "pay_1"),
                &tx,
            )
            .unwrap();

        assert_eq!(balance, 54);
        let account = store.get_account(&user_id).unwrap().unwrap();
        let sub = account.subscription.unwrap();
        assert_eq!(sub.tier, SubscriptionTier::Plus);
        assert_eq!(sub.payment_id, "pay_1");
        assert!(store.is_payment_processed("pay_1").unwrap());
    }

    #[test]
    fn settle_payment_rejects_replay() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 0);

        let tx = CoinTransaction::subscription_purchase(user_id, SubscriptionTier::Pro, "pay_dup");
        store
            .settle_subscription_payment(
                &user_id,
                "pay_dup",
                subscription(SubscriptionTier::Pro, "pay_dup"),
                &tx,
            )
            .unwrap();

        let tx2 = CoinTransaction::subscription_purchase(user_id, SubscriptionTier::Pro, "pay_dup");
        let result = store.settle_subscription_payment(
            &user_id,
            "pay_dup",
            subscription(SubscriptionTier::Pro, "pay_dup"),
            &tx2,
        );

        assert!(matches!(
            result,
            Err(StoreError::PaymentAlreadyProcessed { .. })
        ));

        // Credited exactly once.
        let account = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.coin_balance, 150);
        assert_eq!(
            store
                .list_transactions_by_user(&user_id, 10, 0)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn clear_subscription_keeps_balance() {
        let (store, _dir) = create_test_store();
        let user_id = create_account_with_balance(&store, 0);

        let tx = CoinTransaction::subscription_purchase(user_id, SubscriptionTier::Ultra, "pay_u");
        store
            .settle_subscription_payment(
                &user_id,
                "pay_u",
                subscription(SubscriptionTier::Ultra, "pay_u"),
                &tx,
            )
            .unwrap();

        store.clear_subscription(&user_id).unwrap();

        let account = store.get_account(&user_id).unwrap().unwrap();
        assert!(account.subscription.is_none());
        assert_eq!(account.coin_balance, 500);
    }

    #[test]
    fn analytics_events_roundtrip() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let event = AnalyticsEvent::new(
            user_id,
            "subscription_purchase",
            serde_json::json!({"tier": "plus", "coins_granted": 50}),
        );
        store.put_analytics_event(&event).unwrap();

        let events = store.list_analytics_events_by_user(&user_id, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "subscription_purchase");
    }
}
