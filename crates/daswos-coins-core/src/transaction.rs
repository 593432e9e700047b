//! Coin transaction types.
//!
//! Every committed coin movement appends exactly one transaction record.
//! Records are immutable once written; the log is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// An immutable record of one coin movement between two wallets.
///
/// Transactions use ULIDs for time-ordered ids, so history queries sort
/// newest-first by id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTransaction {
    /// Unique transaction id (ULID, assigned at creation).
    pub id: TransactionId,

    /// The debited wallet. `UserId::SYSTEM` for purchases and giveaways.
    pub from_user_id: UserId,

    /// The credited wallet.
    pub to_user_id: UserId,

    /// Amount moved, in whole coins. Always positive.
    pub amount: i64,

    /// What kind of movement this records.
    pub transaction_type: TransactionType,

    /// When the transaction was created.
    pub timestamp: DateTime<Utc>,

    /// Opaque external payment reference (e.g. a Stripe payment intent id).
    /// Present only on purchases.
    pub reference_id: Option<String>,

    /// Human-readable description.
    pub description: String,
}

impl CoinTransaction {
    /// Create a purchase record: system wallet to user, backed by an
    /// out-of-band payment identified by `reference_id`.
    #[must_use]
    pub fn purchase(to_user_id: UserId, amount: i64, reference_id: String) -> Self {
        Self {
            id: TransactionId::generate(),
            from_user_id: UserId::SYSTEM,
            to_user_id,
            amount,
            transaction_type: TransactionType::Purchase,
            timestamp: Utc::now(),
            reference_id: Some(reference_id),
            description: format!("Purchase of {amount} DasWos Coins"),
        }
    }

    /// Create a giveaway record: system wallet to user, no payment attached.
    #[must_use]
    pub fn giveaway(to_user_id: UserId, amount: i64, reason: String) -> Self {
        Self {
            id: TransactionId::generate(),
            from_user_id: UserId::SYSTEM,
            to_user_id,
            amount,
            transaction_type: TransactionType::Giveaway,
            timestamp: Utc::now(),
            reference_id: None,
            description: reason,
        }
    }

    /// Create a user-to-user transfer record.
    #[must_use]
    pub fn transfer(
        from_user_id: UserId,
        to_user_id: UserId,
        amount: i64,
        description: String,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            from_user_id,
            to_user_id,
            amount,
            transaction_type: TransactionType::Transfer,
            timestamp: Utc::now(),
            reference_id: None,
            description,
        }
    }

    /// Whether `user_id` is a participant (source or destination).
    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }
}

/// Type of coin movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// System to user, backed by an external real-money payment.
    Purchase,

    /// System to user, administrator grant with no payment.
    Giveaway,

    /// User to user.
    Transfer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_is_system_funded_with_reference() {
        let tx = CoinTransaction::purchase(UserId::new(42), 300, "pi_abc".into());

        assert_eq!(tx.from_user_id, UserId::SYSTEM);
        assert_eq!(tx.to_user_id, UserId::new(42));
        assert_eq!(tx.amount, 300);
        assert_eq!(tx.transaction_type, TransactionType::Purchase);
        assert_eq!(tx.reference_id.as_deref(), Some("pi_abc"));
    }

    #[test]
    fn giveaway_has_no_reference() {
        let tx = CoinTransaction::giveaway(UserId::new(7), 50, "Welcome bonus".into());

        assert_eq!(tx.from_user_id, UserId::SYSTEM);
        assert_eq!(tx.transaction_type, TransactionType::Giveaway);
        assert!(tx.reference_id.is_none());
        assert_eq!(tx.description, "Welcome bonus");
    }

    #[test]
    fn transfer_links_both_participants() {
        let tx = CoinTransaction::transfer(UserId::new(1), UserId::new(2), 40, "gift".into());

        assert_eq!(tx.transaction_type, TransactionType::Transfer);
        assert!(tx.involves(UserId::new(1)));
        assert!(tx.involves(UserId::new(2)));
        assert!(!tx.involves(UserId::new(3)));
        assert!(tx.reference_id.is_none());
    }
}
