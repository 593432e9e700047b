//! `RocksDB` storage layer for the DasWos Coins ledger.
//!
//! This crate provides durable storage for wallets, the append-only
//! transaction log, and the supply-ledger singleton.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `wallets`: Wallet records, keyed by `user_id`
//! - `transactions`: Coin transactions, keyed by `transaction_id` (ULID)
//! - `transactions_by_user`: Index for listing transactions by participant
//! - `supply`: The singleton supply-ledger row
//!
//! # Atomicity
//!
//! A coin movement is a read-validate-write sequence over two wallets plus a
//! transaction append. [`Store::move_coins`] commits all of it in one batch,
//! and the read-modify-write section is serialized so two concurrent
//! movements touching the same wallet can never both read a stale balance.
//! No observer ever sees a wallet updated without its matching transaction
//! record, or vice versa.
//!
//! # Example
//!
//! ```no_run
//! use daswos_coins_store::{RocksStore, Store};
//! use daswos_coins_core::{UserId, Wallet};
//!
//! let store = RocksStore::open("/tmp/daswos-coins-db").unwrap();
//!
//! let wallet = Wallet::with_balance(UserId::SYSTEM, 1_000_000);
//! store.put_wallet(&wallet).unwrap();
//!
//! let retrieved = store.get_wallet(UserId::SYSTEM).unwrap();
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

use daswos_coins_core::{CoinSupply, CoinTransaction, TransactionId, UserId, Wallet};

/// The storage trait defining all ledger persistence operations.
///
/// This trait abstracts the storage layer so the coin ledger can be tested
/// against a substitute implementation and is never coupled to a global
/// database handle.
pub trait Store: Send + Sync {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    /// Insert or overwrite a wallet record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_wallet(&self, wallet: &Wallet) -> Result<()>;

    /// Get a wallet by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_wallet(&self, user_id: UserId) -> Result<Option<Wallet>>;

    /// Get the wallet for `user_id`, creating it with a zero balance if it
    /// does not exist yet. Creation is idempotent: a concurrent second call
    /// observes the wallet created by the first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet>;

    // =========================================================================
    // Coin Movements
    // =========================================================================

    /// Atomically move `record.amount` coins from `record.from_user_id` to
    /// `record.to_user_id` and append the transaction record.
    ///
    /// The source wallet must exist; the destination wallet is created with a
    /// zero balance if absent. Both wallet updates, the transaction record,
    /// and the participant index entries commit in a single batch.
    ///
    /// Returns the post-movement balances `(from_balance, to_balance)`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::WalletNotFound`] if the source wallet does not exist.
    /// - [`StoreError::InsufficientFunds`] if the source balance is below
    ///   `record.amount`. No state changes in either case.
    fn move_coins(&self, record: &CoinTransaction) -> Result<(i64, i64)>;

    // =========================================================================
    // Transaction Log
    // =========================================================================

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: TransactionId) -> Result<Option<CoinTransaction>>;

    /// List transactions where `user_id` is source or destination, newest
    /// first, paginated by `limit` and `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_for_user(
        &self,
        user_id: UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>>;

    // =========================================================================
    // Supply Ledger
    // =========================================================================

    /// Read the singleton supply row, if provisioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_supply(&self) -> Result<Option<CoinSupply>>;

    /// Write the singleton supply row (provisioning only).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_supply(&self, supply: &CoinSupply) -> Result<()>;
}
