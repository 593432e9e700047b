//! Error types for the coins storage layer.

use daswos_coins_core::UserId;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The source wallet for a movement does not exist.
    #[error("wallet not found: {user_id}")]
    WalletNotFound {
        /// The wallet owner that was not found.
        user_id: UserId,
    },

    /// Source balance cannot cover the movement.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current source balance in coins.
        balance: i64,
        /// Required amount in coins.
        required: i64,
    },
}
