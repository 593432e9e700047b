//! Coin supply accounting.

use serde::{Deserialize, Serialize};

/// The singleton supply ledger.
///
/// Caps the total coins the system may ever put into circulation. The supply
/// check is advisory: the purchase-initiation endpoint reads it before
/// creating a checkout session, but ledger operations do not write it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CoinSupply {
    /// Maximum coins permitted to ever circulate.
    pub total_amount: i64,

    /// Coins already issued into user-reachable circulation.
    pub minted_amount: i64,
}

impl CoinSupply {
    /// Create a supply ledger with the given cap and nothing minted.
    #[must_use]
    pub const fn with_cap(total_amount: i64) -> Self {
        Self {
            total_amount,
            minted_amount: 0,
        }
    }

    /// Coins still available under the cap.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.total_amount - self.minted_amount
    }

    /// Whether minting `amount` more coins would stay within the cap.
    #[must_use]
    pub const fn allows_minting(&self, amount: i64) -> bool {
        self.minted_amount + amount <= self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_supply_is_zero() {
        let supply = CoinSupply::default();
        assert_eq!(supply.total_amount, 0);
        assert_eq!(supply.minted_amount, 0);
    }

    #[test]
    fn minting_respects_cap() {
        let mut supply = CoinSupply::with_cap(1000);
        assert!(supply.allows_minting(1000));
        assert!(!supply.allows_minting(1001));

        supply.minted_amount = 900;
        assert_eq!(supply.remaining(), 100);
        assert!(supply.allows_minting(100));
        assert!(!supply.allows_minting(101));
    }
}
