//! `RocksDB` storage implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use daswos_coins_core::{CoinSupply, CoinTransaction, TransactionId, UserId, Wallet};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
///
/// Compound read-modify-write operations (`move_coins`,
/// `get_or_create_wallet`) serialize through `commit_lock` and flush their
/// writes in a single `WriteBatch`, so a movement is all-or-nothing and two
/// concurrent movements on the same wallet cannot both read a stale balance.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    commit_lock: Mutex<()>,
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
            commit_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
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

    /// Write a wallet without taking the commit lock (caller holds it).
    fn put_wallet_raw(&self, wallet: &Wallet) -> Result<()> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(wallet.user_id);
        let value = Self::serialize(wallet)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    fn put_wallet(&self, wallet: &Wallet) -> Result<()> {
        let _guard = self.commit_lock.lock().expect("commit lock poisoned");
        self.put_wallet_raw(wallet)
    }

    fn get_wallet(&self, user_id: UserId) -> Result<Option<Wallet>> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet> {
        // Check-then-create must hold the commit lock so two concurrent
        // first-touch calls cannot both decide to create.
        let _guard = self.commit_lock.lock().expect("commit lock poisoned");

        if let Some(wallet) = self.get_wallet(user_id)? {
            return Ok(wallet);
        }

        let wallet = Wallet::new(user_id);
        self.put_wallet_raw(&wallet)?;

        tracing::debug!(user_id = %user_id, "Created wallet");

        Ok(wallet)
    }

    // =========================================================================
    // Coin Movements
    // =========================================================================

    fn move_coins(&self, record: &CoinTransaction) -> Result<(i64, i64)> {
        let _guard = self.commit_lock.lock().expect("commit lock poisoned");

        // Source must exist; validated before anything is written.
        let mut from_wallet =
            self.get_wallet(record.from_user_id)?
                .ok_or(StoreError::WalletNotFound {
                    user_id: record.from_user_id,
                })?;

        if !from_wallet.has_sufficient_funds(record.amount) {
            return Err(StoreError::InsufficientFunds {
                balance: from_wallet.balance,
                required: record.amount,
            });
        }

        // Destination is created lazily with a zero balance.
        let mut to_wallet = self
            .get_wallet(record.to_user_id)?
            .unwrap_or_else(|| Wallet::new(record.to_user_id));

        let now = chrono::Utc::now();
        from_wallet.balance -= record.amount;
        from_wallet.last_updated = now;
        to_wallet.balance += record.amount;
        to_wallet.last_updated = now;

        let cf_wallets = self.cf(cf::WALLETS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let from_key = keys::wallet_key(record.from_user_id);
        let to_key = keys::wallet_key(record.to_user_id);
        let tx_key = keys::transaction_key(record.id);
        let from_index_key = keys::user_transaction_key(record.from_user_id, record.id);
        let to_index_key = keys::user_transaction_key(record.to_user_id, record.id);

        let from_value = Self::serialize(&from_wallet)?;
        let to_value = Self::serialize(&to_wallet)?;
        let tx_value = Self::serialize(record)?;

        // Both wallets, the record, and both index entries commit together.
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_wallets, from_key, &from_value);
        batch.put_cf(&cf_wallets, to_key, &to_value);
        batch.put_cf(&cf_tx, tx_key, &tx_value);
        batch.put_cf(&cf_tx_by_user, &from_index_key, []);
        batch.put_cf(&cf_tx_by_user, &to_index_key, []);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok((from_wallet.balance, to_wallet.balance))
    }

    // =========================================================================
    // Transaction Log
    // =========================================================================

    fn get_transaction(&self, transaction_id: TransactionId) -> Result<Option<CoinTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_for_user(
        &self,
        user_id: UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_transactions_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Collect the user's index keys; ULIDs sort oldest-first within the
        // prefix, so reversing yields newest-first.
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
            if let Some(tx) = self.get_transaction(tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Supply Ledger
    // =========================================================================

    fn get_supply(&self) -> Result<Option<CoinSupply>> {
        let cf = self.cf(cf::SUPPLY)?;

        self.db
            .get_cf(&cf, keys::SUPPLY_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_supply(&self, supply: &CoinSupply) -> Result<()> {
        let cf = self.cf(cf::SUPPLY)?;
        let value = Self::serialize(supply)?;

        self.db
            .put_cf(&cf, keys::SUPPLY_KEY, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
