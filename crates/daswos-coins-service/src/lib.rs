//! DasWos Coins HTTP API Service.
//!
//! This crate provides the HTTP surface of the coins ledger, including:
//!
//! - Balance and transaction-history reads
//! - Purchase initiation (Stripe checkout sessions)
//! - User-to-user transfers
//! - Administrator coin grants
//! - Stripe webhooks (the only path that credits purchased coins)
//!
//! # Authentication
//!
//! Two authentication methods:
//!
//! 1. **User bearer tokens** - For requests made on behalf of a marketplace
//!    user.
//! 2. **Admin API key** - For administrator grants (`/v1/coins/give`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stripe;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{StripeClient, StripeError};
