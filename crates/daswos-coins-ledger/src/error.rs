//! Error types for ledger operations.

use daswos_coins_core::UserId;
use daswos_coins_store::StoreError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in coin ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The amount is zero or negative.
    #[error("invalid amount: {0} (must be positive)")]
    InvalidAmount(i64),

    /// Source and destination are the same wallet.
    #[error("cannot move coins from a wallet to itself: {user_id}")]
    SelfMovement {
        /// The wallet appearing on both sides.
        user_id: UserId,
    },

    /// The reserved system wallet was used as an ordinary participant.
    #[error("the system wallet cannot participate in this operation")]
    ReservedWallet,

    /// The sender's wallet does not exist (transfers never create it).
    #[error("sender wallet not found: {user_id}")]
    SenderWalletNotFound {
        /// The sender whose wallet is missing.
        user_id: UserId,
    },

    /// The sender cannot cover the transfer.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current sender balance in coins.
        balance: i64,
        /// Required amount in coins.
        required: i64,
    },

    /// The system wallet cannot fund the purchase or giveaway.
    #[error("insufficient system funds: available={available}, required={required}")]
    InsufficientSystemFunds {
        /// Current system wallet balance in coins.
        available: i64,
        /// Required amount in coins.
        required: i64,
    },

    /// The reserved system wallet was never provisioned. This is a
    /// deployment fault, not a user-facing condition.
    #[error("system wallet has not been provisioned")]
    SystemWalletMissing,

    /// Storage fault. Safe to retry the whole operation: nothing partial
    /// was committed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
