//! The DasWos Coins ledger service.
//!
//! [`CoinLedger`] is the only component permitted to mutate wallet balances.
//! Every mutating operation follows the same discipline: validate, debit the
//! source, credit the destination, append the transaction record. The whole
//! sequence commits as one atomic store write or not at all. The store it
//! runs against is injected, so tests can substitute any [`Store`]
//! implementation.
//!
//! # Operations
//!
//! - [`CoinLedger::balance`]: read (and lazily create) a user's wallet
//! - [`CoinLedger::purchase`]: credit purchased coins out of the system wallet
//! - [`CoinLedger::give`]: administrator grant out of the system wallet
//! - [`CoinLedger::transfer`]: move coins between two user wallets
//! - [`CoinLedger::total_supply`]: read the advisory supply ledger
//! - [`CoinLedger::history`]: a user's transactions, newest first
//! - [`CoinLedger::provision`]: startup creation of the system wallet and
//!   supply row

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;

pub use error::{LedgerError, Result};

use std::sync::Arc;

use daswos_coins_core::{CoinSupply, CoinTransaction, UserId};
use daswos_coins_store::{Store, StoreError};

/// Default page size for transaction history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Upper bound on a single history page.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// The coin ledger service.
///
/// Cheap to clone; all clones share the same injected store.
#[derive(Clone)]
pub struct CoinLedger {
    store: Arc<dyn Store>,
}

impl CoinLedger {
    /// Create a ledger backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Provision the reserved system wallet and the supply row if absent.
    ///
    /// Run once at startup so a missing system wallet surfaces as a
    /// deployment error before any request is served. Existing state is
    /// left untouched, so re-running on every boot is safe.
    ///
    /// # Errors
    ///
    /// Returns a store error if provisioning cannot be persisted.
    pub fn provision(&self, system_reserve: i64, supply_cap: i64) -> Result<()> {
        if self.store.get_wallet(UserId::SYSTEM)?.is_none() {
            let wallet =
                daswos_coins_core::Wallet::with_balance(UserId::SYSTEM, system_reserve);
            self.store.put_wallet(&wallet)?;
            tracing::info!(reserve = system_reserve, "Provisioned system wallet");
        }

        if self.store.get_supply()?.is_none() {
            self.store.put_supply(&CoinSupply::with_cap(supply_cap))?;
            tracing::info!(cap = supply_cap, "Provisioned supply ledger");
        }

        Ok(())
    }

    /// Get a user's balance, lazily creating the wallet at zero.
    ///
    /// # Errors
    ///
    /// Returns a store error if the wallet cannot be read or created.
    pub fn balance(&self, user_id: UserId) -> Result<i64> {
        let wallet = self.store.get_or_create_wallet(user_id)?;
        Ok(wallet.balance)
    }

    /// Credit `amount` purchased coins to `user_id`, debiting the system
    /// wallet. `payment_ref` is the opaque reference of the already-collected
    /// external payment.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount <= 0`.
    /// - [`LedgerError::ReservedWallet`] if the target is the system wallet.
    /// - [`LedgerError::SystemWalletMissing`] if wallet `0` was never
    ///   provisioned.
    /// - [`LedgerError::InsufficientSystemFunds`] if the system balance is
    ///   below `amount`.
    pub fn purchase(
        &self,
        user_id: UserId,
        amount: i64,
        payment_ref: String,
    ) -> Result<CoinTransaction> {
        validate_amount(amount)?;
        if user_id.is_system() {
            return Err(LedgerError::ReservedWallet);
        }

        let record = CoinTransaction::purchase(user_id, amount, payment_ref);
        let (system_balance, user_balance) = self
            .store
            .move_coins(&record)
            .map_err(map_system_funded_error)?;

        tracing::info!(
            user_id = %user_id,
            amount,
            user_balance,
            system_balance,
            reference_id = ?record.reference_id,
            transaction_id = %record.id,
            "Coins purchased"
        );

        Ok(record)
    }

    /// Grant `amount` coins to `user_id` with no payment attached.
    ///
    /// Authorization is the caller's responsibility; the HTTP boundary
    /// restricts this to administrators.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CoinLedger::purchase`].
    pub fn give(&self, user_id: UserId, amount: i64, reason: String) -> Result<CoinTransaction> {
        validate_amount(amount)?;
        if user_id.is_system() {
            return Err(LedgerError::ReservedWallet);
        }

        let record = CoinTransaction::giveaway(user_id, amount, reason);
        let (system_balance, user_balance) = self
            .store
            .move_coins(&record)
            .map_err(map_system_funded_error)?;

        tracing::info!(
            user_id = %user_id,
            amount,
            user_balance,
            system_balance,
            transaction_id = %record.id,
            "Coins granted"
        );

        Ok(record)
    }

    /// Move `amount` coins from one user to another.
    ///
    /// The sender's wallet must already exist; the recipient's is created
    /// lazily.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount <= 0`.
    /// - [`LedgerError::SelfMovement`] if sender and recipient are equal.
    /// - [`LedgerError::ReservedWallet`] if either side is the system wallet.
    /// - [`LedgerError::SenderWalletNotFound`] if the sender has no wallet.
    /// - [`LedgerError::InsufficientBalance`] if the sender cannot cover
    ///   `amount`.
    pub fn transfer(
        &self,
        from_user_id: UserId,
        to_user_id: UserId,
        amount: i64,
        description: String,
    ) -> Result<CoinTransaction> {
        validate_amount(amount)?;
        if from_user_id == to_user_id {
            return Err(LedgerError::SelfMovement {
                user_id: from_user_id,
            });
        }
        if from_user_id.is_system() || to_user_id.is_system() {
            return Err(LedgerError::ReservedWallet);
        }

        let record = CoinTransaction::transfer(from_user_id, to_user_id, amount, description);
        let (from_balance, to_balance) =
            self.store
                .move_coins(&record)
                .map_err(|e| match e {
                    StoreError::WalletNotFound { user_id } => {
                        LedgerError::SenderWalletNotFound { user_id }
                    }
                    StoreError::InsufficientFunds { balance, required } => {
                        LedgerError::InsufficientBalance { balance, required }
                    }
                    other => LedgerError::Store(other),
                })?;

        tracing::info!(
            from_user_id = %from_user_id,
            to_user_id = %to_user_id,
            amount,
            from_balance,
            to_balance,
            transaction_id = %record.id,
            "Coins transferred"
        );

        Ok(record)
    }

    /// Read the supply ledger. Returns zeros when uninitialized rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns a store error if the supply row cannot be read.
    pub fn total_supply(&self) -> Result<CoinSupply> {
        Ok(self.store.get_supply()?.unwrap_or_default())
    }

    /// List a user's transactions, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`] and is capped at
    /// [`MAX_HISTORY_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read.
    pub fn history(
        &self,
        user_id: UserId,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT);
        Ok(self.store.list_transactions_for_user(user_id, limit, offset)?)
    }
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

/// For system-funded movements the source is wallet `0`, so store-level
/// source failures mean the deployment is misconfigured or the pool is dry.
fn map_system_funded_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::WalletNotFound { user_id } if user_id.is_system() => {
            LedgerError::SystemWalletMissing
        }
        StoreError::InsufficientFunds { balance, required } => {
            LedgerError::InsufficientSystemFunds {
                available: balance,
                required,
            }
        }
        other => LedgerError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daswos_coins_core::TransactionType;
    use daswos_coins_store::RocksStore;
    use tempfile::TempDir;

    fn create_test_ledger() -> (CoinLedger, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (CoinLedger::new(Arc::new(store)), dir)
    }

    fn provisioned_ledger(reserve: i64) -> (CoinLedger, TempDir) {
        let (ledger, dir) = create_test_ledger();
        ledger.provision(reserve, 1_000_000).unwrap();
        (ledger, dir)
    }

    #[test]
    fn balance_lazily_creates_wallet() {
        let (ledger, _dir) = create_test_ledger();

        assert_eq!(ledger.balance(UserId::new(42)).unwrap(), 0);
        // Second call sees the same wallet, not a fresh one.
        assert_eq!(ledger.balance(UserId::new(42)).unwrap(), 0);
    }

    #[test]
    fn purchase_moves_from_system_to_user() {
        let (ledger, _dir) = provisioned_ledger(1000);

        let tx = ledger.purchase(UserId::new(42), 300, "pi_abc".into()).unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Purchase);
        assert_eq!(tx.reference_id.as_deref(), Some("pi_abc"));
        assert_eq!(ledger.balance(UserId::new(42)).unwrap(), 300);
        assert_eq!(ledger.balance(UserId::SYSTEM).unwrap(), 700);
    }

    #[test]
    fn purchase_fails_when_system_pool_is_dry() {
        let (ledger, _dir) = provisioned_ledger(50);
        ledger.balance(UserId::new(42)).unwrap();

        let result = ledger.purchase(UserId::new(42), 300, "pi_x".into());
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientSystemFunds {
                available: 50,
                required: 300
            })
        ));

        // Nothing moved, nothing recorded.
        assert_eq!(ledger.balance(UserId::SYSTEM).unwrap(), 50);
        assert_eq!(ledger.balance(UserId::new(42)).unwrap(), 0);
        assert!(ledger.history(UserId::new(42), None, 0).unwrap().is_empty());
    }

    #[test]
    fn purchase_without_provisioned_system_wallet_is_fatal() {
        let (ledger, _dir) = create_test_ledger();

        let result = ledger.purchase(UserId::new(42), 300, "pi_abc".into());
        assert!(matches!(result, Err(LedgerError::SystemWalletMissing)));
    }

    #[test]
    fn give_records_a_giveaway_without_reference() {
        let (ledger, _dir) = provisioned_ledger(1000);

        let tx = ledger
            .give(UserId::new(7), 50, "Welcome bonus".into())
            .unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Giveaway);
        assert!(tx.reference_id.is_none());
        assert_eq!(ledger.balance(UserId::new(7)).unwrap(), 50);
        assert_eq!(ledger.balance(UserId::SYSTEM).unwrap(), 950);
    }

    #[test]
    fn transfer_creates_recipient_wallet() {
        let (ledger, _dir) = provisioned_ledger(1000);
        ledger.give(UserId::new(1), 100, "seed".into()).unwrap();

        let tx = ledger
            .transfer(UserId::new(1), UserId::new(2), 40, "gift".into())
            .unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Transfer);
        assert_eq!(ledger.balance(UserId::new(1)).unwrap(), 60);
        assert_eq!(ledger.balance(UserId::new(2)).unwrap(), 40);
    }

    #[test]
    fn transfer_requires_existing_sender_wallet() {
        let (ledger, _dir) = provisioned_ledger(1000);

        let result = ledger.transfer(UserId::new(1), UserId::new(2), 40, "gift".into());
        assert!(matches!(
            result,
            Err(LedgerError::SenderWalletNotFound { .. })
        ));
    }

    #[test]
    fn transfer_rejects_insufficient_balance_without_state_change() {
        let (ledger, _dir) = provisioned_ledger(1000);
        ledger.give(UserId::new(1), 10, "seed".into()).unwrap();

        let result = ledger.transfer(UserId::new(1), UserId::new(2), 40, "gift".into());
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                balance: 10,
                required: 40
            })
        ));

        assert_eq!(ledger.balance(UserId::new(1)).unwrap(), 10);
        assert_eq!(ledger.balance(UserId::new(2)).unwrap(), 0);
    }

    #[test]
    fn mutating_operations_reject_non_positive_amounts() {
        let (ledger, _dir) = provisioned_ledger(1000);
        ledger.give(UserId::new(1), 100, "seed".into()).unwrap();

        assert!(matches!(
            ledger.purchase(UserId::new(1), 0, "pi".into()),
            Err(LedgerError::InvalidAmount(0))
        ));
        assert!(matches!(
            ledger.give(UserId::new(1), -5, "oops".into()),
            Err(LedgerError::InvalidAmount(-5))
        ));
        assert!(matches!(
            ledger.transfer(UserId::new(1), UserId::new(2), 0, "x".into()),
            Err(LedgerError::InvalidAmount(0))
        ));
    }

    #[test]
    fn transfer_rejects_self_and_system_participants() {
        let (ledger, _dir) = provisioned_ledger(1000);
        ledger.give(UserId::new(1), 100, "seed".into()).unwrap();

        assert!(matches!(
            ledger.transfer(UserId::new(1), UserId::new(1), 10, "self".into()),
            Err(LedgerError::SelfMovement { .. })
        ));
        assert!(matches!(
            ledger.transfer(UserId::new(1), UserId::SYSTEM, 10, "to system".into()),
            Err(LedgerError::ReservedWallet)
        ));
        assert!(matches!(
            ledger.purchase(UserId::SYSTEM, 10, "pi".into()),
            Err(LedgerError::ReservedWallet)
        ));
    }

    #[test]
    fn supply_reads_zero_when_unprovisioned() {
        let (ledger, _dir) = create_test_ledger();

        let supply = ledger.total_supply().unwrap();
        assert_eq!(supply.total_amount, 0);
        assert_eq!(supply.minted_amount, 0);
    }

    #[test]
    fn provision_is_idempotent() {
        let (ledger, _dir) = create_test_ledger();
        ledger.provision(1000, 5000).unwrap();
        ledger.give(UserId::new(1), 100, "seed".into()).unwrap();

        // Re-provisioning must not reset the drained pool.
        ledger.provision(1000, 5000).unwrap();
        assert_eq!(ledger.balance(UserId::SYSTEM).unwrap(), 900);
        assert_eq!(ledger.total_supply().unwrap().total_amount, 5000);
    }

    #[test]
    fn history_is_scoped_to_participants_and_newest_first() {
        let (ledger, _dir) = provisioned_ledger(10_000);
        ledger.give(UserId::new(1), 500, "seed".into()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        ledger
            .transfer(UserId::new(1), UserId::new(2), 200, "gift".into())
            .unwrap();

        let history = ledger.history(UserId::new(1), None, 0).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction_type, TransactionType::Transfer);
        assert_eq!(history[1].transaction_type, TransactionType::Giveaway);
        assert!(history.iter().all(|tx| tx.involves(UserId::new(1))));

        let receiver = ledger.history(UserId::new(2), None, 0).unwrap();
        assert_eq!(receiver.len(), 1);

        assert!(ledger.history(UserId::new(3), None, 0).unwrap().is_empty());
    }

    #[test]
    fn history_limit_is_capped() {
        let (ledger, _dir) = provisioned_ledger(100_000);
        for _ in 0..3 {
            ledger.give(UserId::new(1), 1, "drip".into()).unwrap();
        }

        let page = ledger.history(UserId::new(1), Some(2), 0).unwrap();
        assert_eq!(page.len(), 2);

        // Oversized limits are clamped rather than rejected.
        let page = ledger.history(UserId::new(1), Some(10_000), 0).unwrap();
        assert_eq!(page.len(), 3);
    }

    #[test]
    fn concurrent_transfers_exactly_one_succeeds() {
        let (ledger, _dir) = provisioned_ledger(1000);
        ledger.give(UserId::new(1), 50, "seed".into()).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger.transfer(UserId::new(1), UserId::new(2), 50, "race".into())
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let failures = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InsufficientBalance { .. })))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(failures, 1);
        assert_eq!(ledger.balance(UserId::new(1)).unwrap(), 0);
        assert_eq!(ledger.balance(UserId::new(2)).unwrap(), 50);
    }
}
