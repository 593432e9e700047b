//! Coin balance, history, purchase, transfer, and grant handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use daswos_coins_core::{CoinTransaction, UserId};

use crate::auth::{AdminAuth, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Price of one DasWos Coin in USD cents.
pub const COIN_PRICE_CENTS: i64 = 1;

/// Largest single purchase, in coins.
pub const MAX_PURCHASE_COINS: i64 = 100_000;

/// Page cap for the transactions endpoint.
const MAX_PAGE_LIMIT: usize = 50;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Balance in whole coins.
    pub balance: i64,
}

/// Get the caller's coin balance. Creates the wallet on first touch.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.balance(auth.user_id)?;
    Ok(Json(BalanceResponse { balance }))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 10).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    10
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Debited wallet (`0` = system).
    pub from_user_id: i64,
    /// Credited wallet.
    pub to_user_id: i64,
    /// Amount in whole coins (always positive).
    pub amount: i64,
    /// Transaction type.
    pub transaction_type: String,
    /// External payment reference, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Description.
    pub description: String,
    /// Timestamp.
    pub timestamp: String,
}

impl From<&CoinTransaction> for TransactionResponse {
    fn from(tx: &CoinTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            from_user_id: tx.from_user_id.as_i64(),
            to_user_id: tx.to_user_id.as_i64(),
            amount: tx.amount,
            transaction_type: format!("{:?}", tx.transaction_type).to_lowercase(),
            reference_id: tx.reference_id.clone(),
            description: tx.description.clone(),
            timestamp: tx.timestamp.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List the caller's transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(MAX_PAGE_LIMIT);
    let transactions = state
        .ledger
        .history(auth.user_id, Some(limit + 1), query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}

/// Supply response.
#[derive(Debug, Serialize)]
pub struct SupplyResponse {
    /// Maximum coins permitted to circulate.
    pub total_amount: i64,
    /// Coins already issued.
    pub minted_amount: i64,
}

/// Read the supply ledger. Returns zeros when unprovisioned.
pub async fn get_supply(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SupplyResponse>, ApiError> {
    let supply = state.ledger.total_supply()?;
    Ok(Json(SupplyResponse {
        total_amount: supply.total_amount,
        minted_amount: supply.minted_amount,
    }))
}

/// Purchase coins request.
#[derive(Debug, Deserialize)]
pub struct PurchaseCoinsRequest {
    /// Number of coins to purchase.
    pub coin_amount: i64,
}

/// Purchase coins response.
#[derive(Debug, Serialize)]
pub struct PurchaseCoinsResponse {
    /// Stripe checkout session ID for tracking.
    pub session_id: String,
    /// Stripe checkout URL.
    pub checkout_url: String,
}

/// Initiate a coin purchase via Stripe.
///
/// This never touches the ledger: coins are credited by the webhook handler
/// once Stripe confirms the payment completed.
pub async fn purchase_coins(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<PurchaseCoinsRequest>,
) -> Result<Json<PurchaseCoinsResponse>, ApiError> {
    // Validate amount
    if body.coin_amount <= 0 {
        return Err(ApiError::BadRequest("coin_amount must be positive".into()));
    }
    if body.coin_amount > MAX_PURCHASE_COINS {
        return Err(ApiError::BadRequest(format!(
            "maximum purchase is {MAX_PURCHASE_COINS} coins"
        )));
    }

    // Advisory supply ceiling: reject before any Stripe call if minting this
    // purchase would exceed the cap. A zero cap means "not provisioned".
    let supply = state.ledger.total_supply()?;
    if supply.total_amount > 0 && !supply.allows_minting(body.coin_amount) {
        return Err(ApiError::BadRequest(format!(
            "coin supply exhausted: {} of {} coins remain",
            supply.remaining(),
            supply.total_amount
        )));
    }

    // Verify Stripe is configured
    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Stripe not configured".into()))?;

    let amount_cents = body.coin_amount * COIN_PRICE_CENTS;

    tracing::info!(
        user_id = %auth.user_id,
        coin_amount = %body.coin_amount,
        amount_cents = %amount_cents,
        "Initiating coin purchase"
    );

    let success_url = format!(
        "{}/coins/success?session_id={{CHECKOUT_SESSION_ID}}",
        state.config.frontend_url
    );
    let cancel_url = format!("{}/coins/cancel", state.config.frontend_url);

    let session = stripe
        .create_checkout_session(
            &auth.user_id.to_string(),
            amount_cents,
            body.coin_amount,
            &success_url,
            &cancel_url,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create Stripe checkout session");
            ApiError::ExternalService(format!("Failed to create checkout session: {e}"))
        })?;

    let checkout_url = session
        .url
        .ok_or_else(|| ApiError::ExternalService("Stripe returned no checkout URL".into()))?;

    tracing::info!(
        user_id = %auth.user_id,
        session_id = %session.id,
        "Stripe checkout session created"
    );

    Ok(Json(PurchaseCoinsResponse {
        session_id: session.id,
        checkout_url,
    }))
}

/// Transfer coins request.
#[derive(Debug, Deserialize)]
pub struct TransferCoinsRequest {
    /// Recipient user id.
    pub to_user_id: i64,
    /// Amount in whole coins.
    pub amount: i64,
    /// Optional description shown in both histories.
    #[serde(default)]
    pub description: Option<String>,
}

/// Mutation response carrying the created transaction.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The appended transaction record.
    pub transaction: TransactionResponse,
}

/// Transfer coins to another user.
pub async fn transfer_coins(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<TransferCoinsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let description = body
        .description
        .unwrap_or_else(|| "Coin transfer".to_string());

    let tx = state.ledger.transfer(
        auth.user_id,
        UserId::new(body.to_user_id),
        body.amount,
        description,
    )?;

    Ok(Json(MutationResponse {
        success: true,
        transaction: TransactionResponse::from(&tx),
    }))
}

/// Admin give coins request.
#[derive(Debug, Deserialize)]
pub struct GiveCoinsRequest {
    /// User to credit.
    pub user_id: i64,
    /// Amount in whole coins.
    pub amount: i64,
    /// Reason for the grant.
    pub reason: String,
}

/// Admin endpoint to grant coins with no payment attached.
pub async fn give_coins(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Json(body): Json<GiveCoinsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let tx = state
        .ledger
        .give(UserId::new(body.user_id), body.amount, body.reason)?;

    Ok(Json(MutationResponse {
        success: true,
        transaction: TransactionResponse::from(&tx),
    }))
}
