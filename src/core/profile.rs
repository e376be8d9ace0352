//! Profile aggregation - read-side statistics over wallets, transactions,
//! and referrals.
//!
//! Pure derivation with no write effects. Income has one authoritative
//! definition here: referral bonuses plus interest, excluding admin
//! adjustments. USD conversion is fail-open; an unpriced currency
//! contributes zero to the portfolio value.

use crate::{
    core::{referral, transaction, transaction::TransactionKind, user, wallet},
    entities::{
        referral::Model as ReferralModel, transaction::Model as TransactionModel,
        user::Model as UserModel, wallet::Model as WalletModel,
    },
    errors::{Error, Result},
    pricing::PriceOracle,
};
use sea_orm::DatabaseConnection;
use std::str::FromStr;

/// A wallet with its transaction history, newest first.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WalletView {
    /// The wallet itself
    pub wallet: WalletModel,
    /// The wallet's transactions, newest first
    pub transactions: Vec<TransactionModel>,
}

/// Derived statistics over all of a user's wallets and referrals.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProfileStats {
    /// Sum of wallet balances in raw currency units (not USD)
    pub total_balance: f64,
    /// Portfolio value in USD via the price oracle; unpriced wallets count as 0
    pub portfolio_value_usd: f64,
    /// Sum of DEPOSIT amounts
    pub total_deposits: f64,
    /// Sum of WITHDRAWAL amounts
    pub total_withdrawals: f64,
    /// Sum of REFERRAL_BONUS amounts
    pub total_referral_bonus: f64,
    /// Sum of INTEREST amounts
    pub total_interest: f64,
    /// Referral bonuses plus interest; admin adjustments excluded
    pub total_income: f64,
    /// Sum of USD balances on referrals this user has given
    pub referral_income_usd: f64,
    /// Number of transactions across all wallets
    pub total_transaction_count: usize,
    /// Number of users this user has referred
    pub referrals_given_count: usize,
    /// 1 if this user was referred, else 0
    pub referrals_received_count: usize,
}

/// Aggregated view of one user's account.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Profile {
    /// The user
    pub user: UserModel,
    /// All wallets with their transactions
    pub wallets: Vec<WalletView>,
    /// Referrals where this user is the referrer
    pub referrals_given: Vec<ReferralModel>,
    /// The incoming referral, if this user was referred
    pub referral_received: Option<ReferralModel>,
    /// Derived statistics
    pub stats: ProfileStats,
}

/// Builds the aggregated profile for a user.
pub async fn get_profile(
    db: &DatabaseConnection,
    oracle: &dyn PriceOracle,
    user_id: i64,
) -> Result<Profile> {
    let user = user::get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })?;

    let wallets = wallet::get_wallets_for_user(db, user_id).await?;
    let mut views = Vec::with_capacity(wallets.len());
    for w in wallets {
        let transactions = transaction::get_transactions_for_wallet(db, w.id).await?;
        views.push(WalletView {
            wallet: w,
            transactions,
        });
    }

    let referrals_given = referral::get_referrals_given(db, user_id).await?;
    let referral_received = referral::get_referral_received(db, user_id).await?;

    let stats = compute_stats(oracle, &views, &referrals_given, referral_received.as_ref()).await;

    Ok(Profile {
        user,
        wallets: views,
        referrals_given,
        referral_received,
        stats,
    })
}

async fn compute_stats(
    oracle: &dyn PriceOracle,
    wallets: &[WalletView],
    referrals_given: &[ReferralModel],
    referral_received: Option<&ReferralModel>,
) -> ProfileStats {
    let total_balance: f64 = wallets.iter().map(|v| v.wallet.balance).sum();

    let mut total_deposits = 0.0;
    let mut total_withdrawals = 0.0;
    let mut total_referral_bonus = 0.0;
    let mut total_interest = 0.0;
    let mut total_transaction_count = 0;

    for view in wallets {
        for tx in &view.transactions {
            total_transaction_count += 1;
            match TransactionKind::from_str(&tx.kind) {
                Ok(TransactionKind::Deposit) => total_deposits += tx.amount,
                Ok(TransactionKind::Withdrawal) => total_withdrawals += tx.amount,
                Ok(TransactionKind::ReferralBonus) => total_referral_bonus += tx.amount,
                Ok(TransactionKind::Interest) => total_interest += tx.amount,
                Ok(TransactionKind::AdminAdjustment) => {}
                Err(_) => {
                    tracing::warn!(kind = %tx.kind, "unrecognized stored transaction kind");
                }
            }
        }
    }

    let currencies: Vec<String> = wallets
        .iter()
        .map(|v| v.wallet.currency.clone())
        .collect();
    let prices = oracle.prices_usd(&currencies).await;
    let portfolio_value_usd: f64 = wallets
        .iter()
        .map(|v| v.wallet.balance * prices.get(&v.wallet.currency).copied().unwrap_or(0.0))
        .sum();

    let referral_income_usd: f64 = referrals_given.iter().map(|r| r.balance).sum();

    ProfileStats {
        total_balance,
        portfolio_value_usd,
        total_deposits,
        total_withdrawals,
        total_referral_bonus,
        total_interest,
        total_income: total_referral_bonus + total_interest,
        referral_income_usd,
        total_transaction_count,
        referrals_given_count: referrals_given.len(),
        referrals_received_count: usize::from(referral_received.is_some()),
    }
}
