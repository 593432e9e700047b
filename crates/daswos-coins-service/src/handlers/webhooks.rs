//! Stripe webhook handlers.
//!
//! This is the only path that credits purchased coins: the purchase endpoint
//! merely creates a checkout session, and the ledger is touched once Stripe
//! confirms payment. Ledger failures during webhook processing are logged
//! and the webhook is still acknowledged, so Stripe does not endlessly retry
//! an event the service already understood; a confirmed payment whose credit
//! failed must be reconciled out-of-band.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use daswos_coins_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;
use crate::stripe;

/// Stripe webhook payload (simplified).
#[derive(Debug, Deserialize)]
pub struct StripeWebhook {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event ID.
    pub id: String,
    /// Event data.
    pub data: StripeEventData,
}

/// Stripe event data container.
#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    /// Event object.
    pub object: serde_json::Value,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle Stripe webhooks.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());

    // Verify the signature whenever a webhook secret is configured.
    // Verification needs only the secret, so the absence of a Stripe API
    // client never bypasses it.
    if let Some(secret) = &state.config.stripe_webhook_secret {
        let sig =
            signature.ok_or_else(|| ApiError::BadRequest("Missing Stripe signature".into()))?;

        stripe::verify_webhook_signature(secret, &body, sig).map_err(|e| {
            tracing::warn!(error = %e, "Invalid Stripe webhook signature");
            ApiError::BadRequest("Invalid webhook signature".into())
        })?;
    } else {
        // No webhook secret configured - skip verification (development mode)
        tracing::warn!("Stripe webhook secret not configured - skipping signature verification");
    }

    // Parse webhook payload
    let webhook: StripeWebhook =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %webhook.event_type,
        event_id = %webhook.id,
        "Received Stripe webhook"
    );

    match webhook.event_type.as_str() {
        "checkout.session.completed" => {
            handle_checkout_completed(&state, &webhook.data.object);
        }
        "payment_intent.succeeded" => {
            let payment_intent_id = webhook
                .data
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            tracing::info!(payment_intent_id = %payment_intent_id, "Payment succeeded");
        }
        _ => {
            tracing::debug!(event_type = %webhook.event_type, "Unhandled Stripe event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Process a completed checkout session: credit the purchased coins.
///
/// Ledger errors are swallowed deliberately (see module docs). Malformed
/// events are logged and dropped for the same reason: failing the webhook
/// would only make Stripe redeliver an event we will never understand.
fn handle_checkout_completed(state: &AppState, data: &serde_json::Value) {
    let session_id = data
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    let payment_status = data
        .get("payment_status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    // Only process if payment is complete
    if payment_status != "paid" {
        tracing::info!(
            session_id = %session_id,
            payment_status = %payment_status,
            "Checkout session not paid yet, skipping"
        );
        return;
    }

    let Some(user_id) = data
        .get("client_reference_id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<UserId>().ok())
    else {
        tracing::error!(session_id = %session_id, "Checkout session missing client_reference_id");
        return;
    };

    // Get coin amount from metadata, falling back to the charged total
    // (valid only while 1 coin = 1 cent).
    let coin_amount = data
        .get("metadata")
        .and_then(|m| m.get("coin_amount"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .or_else(|| data.get("amount_total").and_then(serde_json::Value::as_i64))
        .unwrap_or(0);

    // Prefer the payment intent as the durable payment reference; the
    // session id still identifies the payment if Stripe omits it.
    let payment_ref = data
        .get("payment_intent")
        .and_then(|v| v.as_str())
        .unwrap_or(session_id)
        .to_string();

    tracing::info!(
        user_id = %user_id,
        session_id = %session_id,
        coin_amount = %coin_amount,
        payment_ref = %payment_ref,
        "Processing checkout completion"
    );

    match state.ledger.purchase(user_id, coin_amount, payment_ref) {
        Ok(tx) => {
            tracing::info!(
                user_id = %user_id,
                coin_amount = %coin_amount,
                transaction_id = %tx.id,
                "Coins credited from Stripe checkout"
            );
        }
        Err(e) => {
            // Acknowledge anyway; reconciliation happens out-of-band.
            tracing::error!(
                user_id = %user_id,
                session_id = %session_id,
                coin_amount = %coin_amount,
                error = %e,
                "Failed to credit purchased coins"
            );
        }
    }
}
