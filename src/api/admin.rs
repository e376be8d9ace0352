//! Admin console routes: login, wallet creation, and ledger mutations.
//!
//! Everything except `login` requires a bearer token issued by
//! [`crate::auth::issue_admin_token`].

use super::AppState;
use crate::{
    auth,
    core::{
        profile, transaction::{self, TransactionKind},
        user, wallet,
    },
    entities,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Admin credential payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Configured admin email
    pub email: String,
    /// Configured admin password
    pub password: String,
}

/// Issued token envelope.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent admin calls
    pub token: String,
}

/// `POST /api/admin/login` — verifies the configured admin credentials and
/// issues a 24-hour JWT.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let token = auth::issue_admin_token(&state.settings, &payload.email, &payload.password)?;
    tracing::info!(email = %payload.email, "admin login");
    Ok(Json(LoginResponse { token }))
}

/// Middleware guarding the admin routes: the `Authorization: Bearer` token
/// must verify against the configured secret.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(Error::Unauthorized)?;

    auth::verify_admin_token(&state.settings, token)?;
    Ok(next.run(request).await)
}

/// Query string for the user listing.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// 1-based page number, default 1
    pub page: Option<u64>,
    /// Page size, default 10
    pub limit: Option<u64>,
    /// Search term matched against email, names, and the auth subject
    pub search: Option<String>,
}

/// `GET /api/admin/users` — paginated, searchable user list for the admin
/// console.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<user::UserPage>> {
    let page = user::list_users(
        &state.db,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
        query.search.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

/// `GET /api/admin/users/{user_id}` — full user detail: wallets with their
/// transactions, referrals, and derived statistics.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<profile::Profile>> {
    let profile = profile::get_profile(&state.db, state.oracle.as_ref(), user_id).await?;
    Ok(Json(profile))
}

/// Wallet creation body.
#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    /// Display name for the wallet
    pub name: String,
    /// Currency identifier (CoinGecko id, e.g. "bitcoin")
    pub currency: String,
}

/// `POST /api/admin/users/{user_id}/wallets` — create a wallet for a user
/// with a zero starting balance.
pub async fn create_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<CreateWalletRequest>,
) -> Result<Json<entities::wallet::Model>> {
    let wallet = wallet::create_wallet(&state.db, user_id, payload.name, payload.currency).await?;
    Ok(Json(wallet))
}

/// Transaction body; `kind` is one of the five canonical kind strings.
#[derive(Debug, Deserialize)]
pub struct RecordTransactionRequest {
    /// Transaction kind, e.g. "DEPOSIT"
    pub kind: String,
    /// Positive, finite amount in wallet currency units
    pub amount: f64,
}

/// Response for a recorded transaction, carrying the bonus summary when the
/// write triggered a referral award.
#[derive(Debug, Serialize)]
pub struct RecordTransactionResponse {
    /// The inserted ledger row
    pub transaction: entities::transaction::Model,
    /// Referral bonus details, present only on a referee's first transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_bonus: Option<crate::core::referral::BonusSummary>,
}

/// `POST /api/admin/wallets/{wallet_id}/transactions` — record a ledger
/// transaction and apply its balance effect atomically.
pub async fn record_transaction(
    State(state): State<AppState>,
    Path(wallet_id): Path<i64>,
    Json(payload): Json<RecordTransactionRequest>,
) -> Result<Json<RecordTransactionResponse>> {
    let kind = TransactionKind::from_str(&payload.kind)?;
    let (tx, bonus) = transaction::record_transaction(
        &state.db,
        state.oracle.as_ref(),
        wallet_id,
        kind,
        payload.amount,
    )
    .await?;
    Ok(Json(RecordTransactionResponse {
        transaction: tx,
        referral_bonus: bonus,
    }))
}

/// `DELETE /api/admin/wallets/{wallet_id}/transactions/{tx_id}` — delete a
/// transaction and reverse its balance effect.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path((wallet_id, tx_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>> {
    transaction::delete_transaction(&state.db, wallet_id, tx_id).await?;
    Ok(Json(serde_json::json!({ "deleted": tx_id })))
}
