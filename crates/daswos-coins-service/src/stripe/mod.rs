//! Stripe payment integration.
//!
//! The ledger never talks real money: this module only creates checkout
//! sessions (purchase initiation) and verifies webhook signatures. Coins are
//! credited exclusively by the webhook handler once Stripe confirms payment.

mod client;
mod types;

pub use client::{verify_webhook_signature, StripeClient, StripeError};
pub use types::{CheckoutSession, StripeErrorBody, StripeErrorResponse};
