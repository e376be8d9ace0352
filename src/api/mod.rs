//! HTTP surface.
//!
//! Thin translation layer over the core modules: handlers deserialize the
//! request, call exactly one core operation, and serialize the result. No
//! business rules live here. Admin routes sit behind a bearer-JWT middleware
//! checked against [`crate::auth`].

pub mod admin;
pub mod referrals;
pub mod users;

use crate::{config::Settings, pricing::PriceOracle};
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub db: DatabaseConnection,
    /// Price oracle for USD conversion
    pub oracle: Arc<dyn PriceOracle>,
    /// Loaded configuration (admin credentials, JWT secret)
    pub settings: Arc<Settings>,
}

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{user_id}", get(admin::get_user))
        .route("/api/admin/users/{user_id}/wallets", post(admin::create_wallet))
        .route(
            "/api/admin/wallets/{wallet_id}/transactions",
            post(admin::record_transaction),
        )
        .route(
            "/api/admin/wallets/{wallet_id}/transactions/{tx_id}",
            delete(admin::delete_transaction),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    Router::new()
        .route("/api/check-user", post(users::check_user))
        .route("/api/referrals/validate", get(referrals::validate))
        .route(
            "/api/users/{subject}/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/api/admin/login", post(admin::login))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
