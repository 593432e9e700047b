//! Core types for the DasWos Coins ledger.
//!
//! This crate provides the foundational types used throughout the coins
//! platform:
//!
//! - **Identifiers**: `UserId`, `TransactionId`
//! - **Wallets**: `Wallet`
//! - **Transactions**: `CoinTransaction`, `TransactionType`
//! - **Supply**: `CoinSupply`
//!
//! # DasWos Coin Unit
//!
//! **1 DasWos Coin is the smallest currency unit**: balances and amounts are
//! whole coins stored as `i64`, never fractions. The reserved wallet
//! [`UserId::SYSTEM`] (id `0`) holds the pool that funds all purchases and
//! giveaways.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod supply;
pub mod transaction;
pub mod wallet;

pub use ids::{IdError, TransactionId, UserId};
pub use supply::CoinSupply;
pub use transaction::{CoinTransaction, TransactionType};
pub use wallet::Wallet;
