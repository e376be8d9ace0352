//! Ledger engine - recording and deleting transactions.
//!
//! Recording a transaction persists the row and applies its signed amount to
//! the wallet balance in one database transaction; deleting a transaction
//! reverses exactly that delta before removing the row. Together they
//! maintain the replay invariant: a wallet's balance always equals the sum of
//! signed amounts over its live transactions.
//!
//! The referral-bonus trigger lives inside the record flow: iff the wallet's
//! owner holds exactly one wallet and has never transacted before, the
//! referral engine is given a chance to award the first-transaction bonus.

use crate::{
    core::referral::{self, BonusSummary},
    core::wallet::update_wallet_balance_atomic,
    entities::{Transaction, Wallet, transaction, wallet},
    errors::{Error, Result},
    pricing::PriceOracle,
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::str::FromStr;

/// The five valid transaction kinds. The sign applied to the wallet balance
/// is implied by the kind; amounts themselves are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Funds added by the user
    Deposit,
    /// Funds removed by the user; the only subtractive kind
    Withdrawal,
    /// Bonus paid out as wallet funds
    ReferralBonus,
    /// Accrued interest
    Interest,
    /// Manual admin correction
    AdminAdjustment,
}

impl TransactionKind {
    /// Canonical string stored in the database and accepted on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::ReferralBonus => "REFERRAL_BONUS",
            Self::Interest => "INTEREST",
            Self::AdminAdjustment => "ADMIN_ADJUSTMENT",
        }
    }

    /// The signed balance delta this kind applies for a positive amount.
    #[must_use]
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Withdrawal => -amount,
            _ => amount,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "REFERRAL_BONUS" => Ok(Self::ReferralBonus),
            "INTEREST" => Ok(Self::Interest),
            "ADMIN_ADJUSTMENT" => Ok(Self::AdminAdjustment),
            _ => Err(Error::InvalidTransactionKind {
                value: value.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records a transaction against a wallet and updates its balance.
///
/// Validates the amount (finite, strictly positive) and the wallet's
/// existence, persists the row, and atomically applies the kind's signed
/// delta to the wallet balance, all inside one database transaction.
///
/// There is deliberately no sufficient-funds floor on withdrawals: the
/// ledger is a book of record whose balance must stay reconstructible by
/// replay, and reversal would be unsound against a floor.
///
/// When this is the owner's first transaction ever (single wallet, no prior
/// transactions anywhere), the referral engine may award the
/// first-transaction bonus; its summary is returned alongside the created
/// transaction.
pub async fn record_transaction(
    db: &DatabaseConnection,
    oracle: &dyn PriceOracle,
    wallet_id: i64,
    kind: TransactionKind,
    amount: f64,
) -> Result<(transaction::Model, Option<BonusSummary>)> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let wallet = Wallet::find_by_id(wallet_id)
        .one(&txn)
        .await?
        .ok_or(Error::WalletNotFound { id: wallet_id })?;

    // First-transaction detection runs before the insert: the owner must
    // hold exactly this one wallet and have zero transactions anywhere.
    let owner_wallets = Wallet::find()
        .filter(wallet::Column::UserId.eq(wallet.user_id))
        .all(&txn)
        .await?;
    let is_first_wallet = owner_wallets.len() == 1 && owner_wallets[0].id == wallet_id;

    let wallet_ids: Vec<i64> = owner_wallets.iter().map(|w| w.id).collect();
    let prior_transactions = Transaction::find()
        .filter(transaction::Column::WalletId.is_in(wallet_ids))
        .count(&txn)
        .await?;
    let is_first_transaction = prior_transactions == 0;

    let row = transaction::ActiveModel {
        wallet_id: Set(wallet_id),
        kind: Set(kind.as_str().to_string()),
        amount: Set(amount),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = row.insert(&txn).await?;

    update_wallet_balance_atomic(&txn, wallet_id, kind.signed(amount)).await?;

    let bonus = if is_first_wallet && is_first_transaction {
        referral::award_first_transaction_bonus(
            &txn,
            oracle,
            wallet.user_id,
            amount,
            &wallet.currency,
        )
        .await?
    } else {
        None
    };

    txn.commit().await?;

    tracing::info!(
        wallet_id,
        kind = %kind,
        amount,
        bonus_awarded = bonus.is_some(),
        "transaction recorded"
    );

    Ok((created, bonus))
}

/// Deletes a transaction and reverses its effect on the wallet balance.
///
/// The transaction must belong to the supplied wallet; a mismatched pair is
/// reported as `TransactionNotFound` rather than reversing a delta against
/// an unrelated wallet. This is a true inverse of [`record_transaction`]:
/// the wallet balance returns to its value before the record call.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    wallet_id: i64,
    transaction_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let tx = Transaction::find_by_id(transaction_id)
        .one(&txn)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    if tx.wallet_id != wallet_id {
        return Err(Error::TransactionNotFound { id: transaction_id });
    }

    Wallet::find_by_id(wallet_id)
        .one(&txn)
        .await?
        .ok_or(Error::WalletNotFound { id: wallet_id })?;

    let kind = TransactionKind::from_str(&tx.kind)?;
    let amount_to_reverse = -kind.signed(tx.amount);

    tx.delete(&txn).await?;
    update_wallet_balance_atomic(&txn, wallet_id, amount_to_reverse).await?;

    txn.commit().await?;

    tracing::info!(wallet_id, transaction_id, "transaction deleted, balance reversed");
    Ok(())
}

/// Retrieves all transactions for a wallet, newest first.
pub async fn get_transactions_for_wallet(
    db: &DatabaseConnection,
    wallet_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::WalletId.eq(wallet_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}
