//! Stripe API client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::crypto::{constant_time_eq, hmac_sha256_hex};

use super::types::{CheckoutSession, StripeErrorResponse};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Invalid webhook signature.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
}

impl StripeClient {
    /// Stripe API base URL.
    const BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Create a Checkout session for a coin purchase.
    ///
    /// The session carries our `user_id` as `client_reference_id` and the
    /// coin amount in metadata so the webhook handler can credit the right
    /// wallet once payment completes.
    pub async fn create_checkout_session(
        &self,
        user_id: &str,
        amount_cents: i64,
        coin_amount: i64,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let params = vec![
            ("mode", "payment".to_string()),
            ("success_url", success_url.to_string()),
            ("cancel_url", cancel_url.to_string()),
            ("client_reference_id", user_id.to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                "DasWos Coins".to_string(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                format!("{coin_amount} DasWos Coins"),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                amount_cents.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("metadata[user_id]", user_id.to_string()),
            ("metadata[coin_amount]", coin_amount.to_string()),
        ];

        tracing::debug!(
            user_id = %user_id,
            amount_cents = %amount_cents,
            coin_amount = %coin_amount,
            "Creating Stripe checkout session"
        );

        let response = self
            .client
            .post(format!("{}/checkout/sessions", Self::BASE_URL))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error
                    .error
                    .message
                    .unwrap_or_else(|| "unknown Stripe error".into()),
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".into(),
                message: format!("Stripe returned status {status}"),
                code: None,
            }),
        }
    }
}

/// Verify a Stripe webhook signature header against the signing secret.
///
/// Header format: `t=timestamp,v1=signature[,v1=signature2,...]`. The signed
/// payload is `"{timestamp}.{payload}"`; any matching `v1` candidate accepts.
/// Needs only the secret, so verification runs even when no API client is
/// configured.
///
/// # Errors
///
/// Returns `StripeError::InvalidSignature` if no candidate signature matches,
/// or a configuration error if the header carries no timestamp.
pub fn verify_webhook_signature(
    secret: &str,
    payload: &str,
    signature: &str,
) -> Result<(), StripeError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature.split(',') {
        let mut kv = part.splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(ts)) => timestamp = Some(ts),
            (Some("v1"), Some(sig)) => signatures.push(sig),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| StripeError::Configuration("Missing timestamp".into()))?;

    if signatures.is_empty() {
        return Err(StripeError::InvalidSignature);
    }

    let signed_payload = format!("{timestamp}.{payload}");
    let expected = hmac_sha256_hex(secret, &signed_payload);

    // Check if any signature matches (constant-time comparison)
    let valid = signatures.iter().any(|sig| constant_time_eq(&expected, sig));

    if valid {
        Ok(())
    } else {
        Err(StripeError::InvalidSignature)
    }
}
