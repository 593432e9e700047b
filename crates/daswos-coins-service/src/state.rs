//! Application state.

use std::sync::Arc;

use daswos_coins_ledger::CoinLedger;
use daswos_coins_store::Store;

use crate::config::ServiceConfig;
use crate::stripe::StripeClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The coin ledger (the only mutator of wallet balances).
    pub ledger: CoinLedger,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Stripe client for payments (optional).
    pub stripe: Option<Arc<StripeClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        // Create Stripe client if configured
        let stripe = config.stripe_api_key.as_ref().map(|key| {
            tracing::info!("Stripe integration enabled");
            Arc::new(StripeClient::new(key))
        });

        if stripe.is_none() {
            tracing::warn!("Stripe not configured - coin purchases will not be available");
        }

        if config.admin_api_key.is_none() {
            tracing::warn!("Admin API key not configured - coin grants will be rejected");
        }

        Self {
            ledger: CoinLedger::new(store),
            config,
            stripe,
        }
    }
}
