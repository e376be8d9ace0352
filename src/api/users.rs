//! User provisioning and profile routes.

use super::AppState;
use crate::{
    core::{profile, user},
    entities,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

/// Identity payload posted after authentication.
#[derive(Debug, Deserialize)]
pub struct CheckUserRequest {
    /// Opaque subject id from the identity provider
    pub auth_subject: String,
    /// Primary email address
    pub email: String,
    /// Optional first name
    pub first_name: Option<String>,
    /// Optional last name
    pub last_name: Option<String>,
    /// Referral code supplied at signup, if any
    pub referral_code: Option<String>,
}

/// `POST /api/check-user` — look up or provision the account for an
/// authenticated identity.
pub async fn check_user(
    State(state): State<AppState>,
    Json(payload): Json<CheckUserRequest>,
) -> Result<Json<entities::user::Model>> {
    let user = user::ensure_user(
        &state.db,
        &payload.auth_subject,
        &payload.email,
        payload.first_name,
        payload.last_name,
        payload.referral_code.as_deref(),
    )
    .await?;
    Ok(Json(user))
}

/// `GET /api/users/{subject}/profile` — aggregated profile with wallets,
/// transactions, referrals, and derived statistics.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<profile::Profile>> {
    let user = user::get_user_by_subject(&state.db, &subject)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: subject.clone(),
        })?;
    let profile = profile::get_profile(&state.db, state.oracle.as_ref(), user.id).await?;
    Ok(Json(profile))
}

/// Partial profile update body; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// Replacement first name
    pub first_name: Option<String>,
    /// Replacement last name
    pub last_name: Option<String>,
    /// Replacement referral code; must not collide with another user's
    pub referral_code: Option<String>,
}

/// `PUT /api/users/{subject}/profile` — partial profile update.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<entities::user::Model>> {
    let user = user::get_user_by_subject(&state.db, &subject)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: subject.clone(),
        })?;
    let updated = user::update_profile(
        &state.db,
        user.id,
        payload.first_name,
        payload.last_name,
        payload.referral_code,
    )
    .await?;
    Ok(Json(updated))
}
