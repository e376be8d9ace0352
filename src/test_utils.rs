//! Shared test utilities for `CoinVault`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and a fixed-price oracle so
//! tests never touch the network.

use crate::{
    core::{referral, user, wallet},
    entities,
    errors::Result,
    pricing::PriceOracle,
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `email` - User email; the auth subject is derived from it
///
/// # Defaults
/// * `first_name` / `last_name`: None
/// * no signup referral code
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::user::Model> {
    user::ensure_user(db, &format!("auth0|{email}"), email, None, None, None).await
}

/// Creates a test user with custom name fields.
/// Use this when display-name behavior matters to the test.
pub async fn create_custom_user(
    db: &DatabaseConnection,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<entities::user::Model> {
    user::ensure_user(
        db,
        &format!("auth0|{email}"),
        email,
        first_name.map(str::to_string),
        last_name.map(str::to_string),
        None,
    )
    .await
}

/// Sets up a complete test environment with a user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    Ok((db, user))
}

/// Sets up a complete test environment with a user and one wallet.
/// Returns (db, user, wallet) for ledger-related tests.
///
/// The wallet holds "bitcoin" so fixed-price oracles can price it.
pub async fn setup_with_wallet() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::wallet::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    let wallet =
        wallet::create_wallet(&db, user.id, "Main".to_string(), "bitcoin".to_string()).await?;
    Ok((db, user, wallet))
}

/// Sets up a referrer and a referee with an established referral link
/// (balance zero, no wallets yet).
/// Returns (db, referrer, referee) for bonus-related tests.
pub async fn setup_with_referral() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let referrer = create_test_user(&db, "referrer@example.com").await?;
    let referee = create_test_user(&db, "referee@example.com").await?;
    referral::establish_referral(&db, referee.id, Some(&referrer.referral_code)).await?;
    Ok((db, referrer, referee))
}

/// A price oracle backed by a fixed in-memory table.
///
/// Currencies absent from the table are unpriced, which exercises the
/// fail-open paths without any network dependency.
#[derive(Debug, Clone, Default)]
pub struct FixedPrices {
    prices: HashMap<String, f64>,
}

impl FixedPrices {
    /// Builds an oracle from (currency, USD price) pairs.
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            prices: pairs
                .into_iter()
                .map(|(currency, price)| (currency.to_string(), price))
                .collect(),
        }
    }

    /// An oracle that prices nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceOracle for FixedPrices {
    async fn price_usd(&self, currency: &str) -> Option<f64> {
        self.prices.get(currency).copied()
    }

    async fn prices_usd(&self, currencies: &[String]) -> HashMap<String, f64> {
        currencies
            .iter()
            .filter_map(|c| self.prices.get(c).map(|price| (c.clone(), *price)))
            .collect()
    }
}
