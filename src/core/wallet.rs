//! Wallet business logic - creation, lookups, and atomic balance updates.
//!
//! Balances are only ever mutated through `update_wallet_balance_atomic`,
//! which the ledger engine calls inside a database transaction. Direct
//! balance writes anywhere else would break the replay invariant.

use crate::{
    entities::{User, Wallet, wallet},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new wallet for a user, starting at balance zero.
///
/// Validates that the name and currency are non-blank and that the owning
/// user exists. Wallet creation is an admin action; the balance is only
/// mutated afterwards through the ledger engine.
pub async fn create_wallet(
    db: &DatabaseConnection,
    user_id: i64,
    name: String,
    currency: String,
) -> Result<wallet::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Wallet name cannot be empty".to_string(),
        });
    }

    if currency.trim().is_empty() {
        return Err(Error::Config {
            message: "Wallet currency cannot be empty".to_string(),
        });
    }

    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })?;

    let wallet = wallet::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.trim().to_string()),
        currency: Set(currency.trim().to_string()),
        balance: Set(0.0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = wallet.insert(db).await?;
    Ok(result)
}

/// Finds a wallet by its unique ID.
pub async fn get_wallet_by_id(
    db: &DatabaseConnection,
    wallet_id: i64,
) -> Result<Option<wallet::Model>> {
    Wallet::find_by_id(wallet_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all wallets owned by a user, oldest first.
pub async fn get_wallets_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<wallet::Model>> {
    Wallet::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .order_by_asc(wallet::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Atomically adds a signed delta to a wallet's balance.
///
/// A single SQL statement (`UPDATE wallets SET balance = balance + ?`) rather
/// than a read-modify-write, so two concurrent mutations of the same wallet
/// cannot lose an update at this level.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `wallet_id` - ID of the wallet to update
/// * `amount_delta` - Signed amount to add to the balance
///
/// # Returns
/// The updated wallet model
pub async fn update_wallet_balance_atomic<C>(
    db: &C,
    wallet_id: i64,
    amount_delta: f64,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let _wallet = Wallet::find_by_id(wallet_id)
        .one(db)
        .await?
        .ok_or(Error::WalletNotFound { id: wallet_id })?;

    Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).add(amount_delta),
        )
        .filter(wallet::Column::Id.eq(wallet_id))
        .exec(db)
        .await?;

    Wallet::find_by_id(wallet_id)
        .one(db)
        .await?
        .ok_or(Error::WalletNotFound { id: wallet_id })
}
