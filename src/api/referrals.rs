//! Referral code validation route.

use super::AppState;
use crate::{core::referral, errors::Result};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

/// Query string for code validation.
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    /// The referral code to check
    pub code: String,
}

/// Validation result; `referrer` is present only for a valid code.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// Whether the code belongs to a user
    pub valid: bool,
    /// Display info for the code's owner, when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<referral::ReferrerInfo>,
}

/// `GET /api/referrals/validate?code=` — pre-signup check that a referral
/// code exists, exposing only the owner's display name.
pub async fn validate(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidateResponse>> {
    let referrer = referral::validate_referral_code(&state.db, &query.code).await?;
    Ok(Json(ValidateResponse {
        valid: referrer.is_some(),
        referrer,
    }))
}
