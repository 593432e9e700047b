//! Wallet types for the DasWos Coins ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A per-user coin wallet.
///
/// Wallets are created lazily with a zero balance the first time an operation
/// references their user id, and are never deleted. The balance is only ever
/// mutated by the coin ledger, inside the same atomic store write that
/// appends the matching transaction record, and stays `>= 0` after every
/// committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// The owning user. `UserId::SYSTEM` marks the reserved system wallet.
    pub user_id: UserId,

    /// Current balance in whole coins.
    pub balance: i64,

    /// When the wallet was last mutated.
    pub last_updated: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet with zero balance.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self::with_balance(user_id, 0)
    }

    /// Create a new wallet with an initial balance.
    ///
    /// Used for provisioning the system wallet; ordinary wallets always start
    /// at zero.
    #[must_use]
    pub fn with_balance(user_id: UserId, balance: i64) -> Self {
        Self {
            user_id,
            balance,
            last_updated: Utc::now(),
        }
    }

    /// Check whether the wallet can cover a debit of `amount` coins.
    #[must_use]
    pub fn has_sufficient_funds(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_has_zero_balance() {
        let wallet = Wallet::new(UserId::new(42));
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.user_id, UserId::new(42));
    }

    #[test]
    fn sufficient_funds_boundary() {
        let mut wallet = Wallet::new(UserId::new(1));
        wallet.balance = 100;

        assert!(wallet.has_sufficient_funds(50));
        assert!(wallet.has_sufficient_funds(100));
        assert!(!wallet.has_sufficient_funds(101));
    }

    #[test]
    fn provisioned_wallet_carries_initial_balance() {
        let wallet = Wallet::with_balance(UserId::SYSTEM, 1_000_000);
        assert_eq!(wallet.balance, 1_000_000);
        assert!(wallet.user_id.is_system());
    }
}
