//! Key encoding utilities for `RocksDB`.

use daswos_coins_core::{TransactionId, UserId};

/// The fixed key of the singleton supply row.
pub const SUPPLY_KEY: &[u8] = b"supply";

/// Create a wallet key from a user id.
#[must_use]
pub fn wallet_key(user_id: UserId) -> [u8; 8] {
    user_id.to_be_bytes()
}

/// Create a transaction key from a transaction id.
#[must_use]
pub fn transaction_key(transaction_id: TransactionId) -> [u8; 16] {
    transaction_id.to_bytes()
}

/// Create a participant index key.
///
/// Format: `user_id (8 bytes, big-endian) || transaction_id (16 bytes)`
///
/// Since ULIDs are time-ordered, a user's index entries sort by time within
/// the user prefix.
#[must_use]
pub fn user_transaction_key(user_id: UserId, transaction_id: TransactionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(&user_id.to_be_bytes());
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions involving a user.
#[must_use]
pub fn user_transactions_prefix(user_id: UserId) -> [u8; 8] {
    user_id.to_be_bytes()
}

/// Extract the transaction id from a participant index key.
///
/// # Panics
///
/// Panics if the key is not at least 24 bytes.
#[must_use]
pub fn extract_transaction_id_from_user_key(key: &[u8]) -> TransactionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[8..24]);
    TransactionId::from_bytes(bytes).expect("valid ULID bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_key_length() {
        let key = wallet_key(UserId::new(42));
        assert_eq!(key.len(), 8);
    }

    #[test]
    fn user_transaction_key_format() {
        let user_id = UserId::new(42);
        let tx_id = TransactionId::generate();
        let key = user_transaction_key(user_id, tx_id);

        assert_eq!(key.len(), 24);
        assert_eq!(&key[..8], &user_id.to_be_bytes());
        assert_eq!(&key[8..], &tx_id.to_bytes());
    }

    #[test]
    fn extract_transaction_id_roundtrip() {
        let tx_id = TransactionId::generate();
        let key = user_transaction_key(UserId::new(7), tx_id);

        let extracted = extract_transaction_id_from_user_key(&key);
        assert_eq!(extracted, tx_id);
    }

    #[test]
    fn index_keys_for_same_user_share_prefix() {
        let user_id = UserId::new(9);
        let a = user_transaction_key(user_id, TransactionId::generate());
        let b = user_transaction_key(user_id, TransactionId::generate());
        assert!(a.starts_with(&user_transactions_prefix(user_id)));
        assert!(b.starts_with(&user_transactions_prefix(user_id)));
    }
}
