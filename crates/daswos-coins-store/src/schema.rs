//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Wallet records, keyed by `user_id` (8-byte big-endian).
    pub const WALLETS: &str = "wallets";

    /// Coin transactions, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by participant, keyed by
    /// `user_id || transaction_id`. Value is empty (index only); each
    /// transaction gets one entry per participant.
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// The singleton supply-ledger row.
    pub const SUPPLY: &str = "supply";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::WALLETS,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::SUPPLY,
    ]
}
