//! Referral bonus engine - relationship establishment and bonus awards.
//!
//! Two trigger points, per the canonical policy:
//! 1. At signup, a valid referral code establishes the relationship with a
//!    zero balance. Invalid and self-referral codes are silently ignored;
//!    signup never fails because of a bad code.
//! 2. When the referee records their first-ever transaction, the ledger
//!    engine calls [`award_first_transaction_bonus`], which writes 10% of the
//!    transaction's USD value onto the referral row. The "first transaction"
//!    precondition keeps later transactions from re-triggering the award.
//!    One caveat: deleting the referee's only transaction makes the
//!    precondition true again, so the next transaction overwrites the bonus
//!    with a freshly computed one.
//!
//! The bonus is accounting-only: it never creates a transaction and never
//! touches the referrer's wallet balances.

use crate::{
    entities::{Referral, User, referral, user},
    errors::Result,
    pricing::PriceOracle,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Fraction of the referee's first-transaction USD value awarded to the referrer.
pub const REFERRAL_BONUS_RATE: f64 = 0.10;

/// Summary of an awarded referral bonus, returned to the caller of the
/// ledger engine for confirmation display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BonusSummary {
    /// Bonus amount in USD written to the referral row
    pub amount_usd: f64,
    /// Raw amount of the referee's first transaction
    pub referee_amount: f64,
    /// Currency of the referee's first transaction
    pub referee_currency: String,
    /// USD value of the referee's first transaction
    pub referee_usd_value: f64,
    /// Display name of the referrer
    pub referrer_name: String,
    /// Email of the referrer
    pub referrer_email: String,
}

/// Information about the owner of a referral code, for signup-form validation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReferrerInfo {
    /// Display name of the referrer
    pub name: String,
    /// The referral code itself
    pub code: String,
}

/// Establishes a referrer→referee relationship at signup time.
///
/// Returns `Ok(None)` without side effects when the code is absent or blank,
/// matches no user, belongs to the referee themselves, or the referee is
/// already referred. Only a fresh, valid relationship creates a row, with
/// `balance = 0`.
pub async fn establish_referral(
    db: &DatabaseConnection,
    referee_id: i64,
    referral_code: Option<&str>,
) -> Result<Option<referral::Model>> {
    let Some(code) = referral_code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let Some(referrer) = find_user_by_code(db, code).await? else {
        tracing::debug!(code, "referral code matched no user, ignoring");
        return Ok(None);
    };

    if referrer.id == referee_id {
        tracing::debug!(user_id = referee_id, "self-referral ignored");
        return Ok(None);
    }

    // At most one referral row per referee
    let existing = Referral::find()
        .filter(referral::Column::RefereeId.eq(referee_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(None);
    }

    let row = referral::ActiveModel {
        referrer_id: Set(referrer.id),
        referee_id: Set(referee_id),
        balance: Set(0.0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = row.insert(db).await?;
    tracing::info!(
        referrer_id = referrer.id,
        referee_id,
        "referral relationship established"
    );

    Ok(Some(created))
}

/// Awards the first-transaction bonus to the referee's referrer, if any.
///
/// Called by the ledger engine once it has established that this is the
/// referee's very first transaction. Computes the USD value of the
/// transaction through the price oracle and writes 10% of it onto the
/// referral row, overwriting whatever balance is there. An unavailable price
/// yields a zero bonus, and a zero bonus records nothing (fail-open pricing).
/// The overwrite matters when the first transaction was deleted: the next
/// transaction qualifies as "first" again and replaces the earlier award
/// rather than adding to it.
pub async fn award_first_transaction_bonus<C>(
    db: &C,
    oracle: &dyn PriceOracle,
    referee_id: i64,
    amount: f64,
    currency: &str,
) -> Result<Option<BonusSummary>>
where
    C: ConnectionTrait,
{
    let Some(referral_row) = Referral::find()
        .filter(referral::Column::RefereeId.eq(referee_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let usd_value = crate::pricing::usd_value(oracle, amount, currency).await;
    let bonus = usd_value * REFERRAL_BONUS_RATE;

    if bonus <= 0.0 {
        tracing::info!(
            referee_id,
            currency,
            "referral bonus computed as zero, nothing recorded"
        );
        return Ok(None);
    }

    let referrer = User::find_by_id(referral_row.referrer_id)
        .one(db)
        .await?
        .ok_or_else(|| crate::errors::Error::UserNotFound {
            id: referral_row.referrer_id.to_string(),
        })?;

    let mut active: referral::ActiveModel = referral_row.into();
    active.balance = Set(bonus);
    active.update(db).await?;

    tracing::info!(
        referee_id,
        referrer_id = referrer.id,
        bonus_usd = bonus,
        "referral bonus awarded on first transaction"
    );

    Ok(Some(BonusSummary {
        amount_usd: bonus,
        referee_amount: amount,
        referee_currency: currency.to_string(),
        referee_usd_value: usd_value,
        referrer_name: referrer.display_name(),
        referrer_email: referrer.email,
    }))
}

/// Looks up the owner of a referral code for signup-form validation.
pub async fn validate_referral_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<ReferrerInfo>> {
    let Some(referrer) = find_user_by_code(db, code.trim()).await? else {
        return Ok(None);
    };

    Ok(Some(ReferrerInfo {
        name: referrer.display_name(),
        code: referrer.referral_code,
    }))
}

/// All referrals where the user is the referrer, newest first.
pub async fn get_referrals_given(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<referral::Model>> {
    Referral::find()
        .filter(referral::Column::ReferrerId.eq(user_id))
        .order_by_desc(referral::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The user's incoming referral, if they were referred.
pub async fn get_referral_received(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<referral::Model>> {
    Referral::find()
        .filter(referral::Column::RefereeId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_user_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::ReferralCode.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_establish_referral_blank_code_is_noop() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        assert!(establish_referral(&db, user.id, None).await?.is_none());
        assert!(establish_referral(&db, user.id, Some("")).await?.is_none());
        assert!(establish_referral(&db, user.id, Some("   ")).await?.is_none());

        assert_eq!(Referral::find().all(&db).await?.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_establish_referral_unknown_code_is_silently_ignored() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let result = establish_referral(&db, user.id, Some("NOSUCHCD")).await?;
        assert!(result.is_none());
        assert_eq!(Referral::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_establish_referral_rejects_self_referral() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let result = establish_referral(&db, user.id, Some(&user.referral_code)).await?;
        assert!(result.is_none());
        assert_eq!(Referral::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_establish_referral_creates_row_at_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = create_test_user(&db, "referrer@example.com").await?;
        let referee = create_test_user(&db, "referee@example.com").await?;

        let row = establish_referral(&db, referee.id, Some(&referrer.referral_code))
            .await?
            .unwrap();

        assert_eq!(row.referrer_id, referrer.id);
        assert_eq!(row.referee_id, referee.id);
        assert_eq!(row.balance, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_establish_referral_trims_code() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = create_test_user(&db, "referrer@example.com").await?;
        let referee = create_test_user(&db, "referee@example.com").await?;

        let code = format!("  {}  ", referrer.referral_code);
        let row = establish_referral(&db, referee.id, Some(&code)).await?;
        assert!(row.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_referral_uniqueness_per_referee() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer_a = create_test_user(&db, "a@example.com").await?;
        let referrer_b = create_test_user(&db, "b@example.com").await?;
        let referee = create_test_user(&db, "referee@example.com").await?;

        let first = establish_referral(&db, referee.id, Some(&referrer_a.referral_code)).await?;
        assert!(first.is_some());

        // Second attempt, even with a different valid code, creates nothing
        let second = establish_referral(&db, referee.id, Some(&referrer_b.referral_code)).await?;
        assert!(second.is_none());

        let rows = Referral::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].referrer_id, referrer_a.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_award_bonus_without_referral_is_noop() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let oracle = FixedPrices::new([("bitcoin", 100.0)]);

        let result =
            award_first_transaction_bonus(&db, &oracle, user.id, 5.0, "bitcoin").await?;
        assert!(result.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_award_bonus_writes_ten_percent_of_usd_value() -> Result<()> {
        let (db, referrer, referee) = setup_with_referral().await?;
        let oracle = FixedPrices::new([("bitcoin", 2.0)]);

        let summary = award_first_transaction_bonus(&db, &oracle, referee.id, 50.0, "bitcoin")
            .await?
            .unwrap();

        // 50 units * $2/unit = $100; 10% = $10
        assert_eq!(summary.referee_usd_value, 100.0);
        assert_eq!(summary.amount_usd, 10.0);
        assert_eq!(summary.referrer_email, referrer.email);

        let row = get_referral_received(&db, referee.id).await?.unwrap();
        assert_eq!(row.balance, 10.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_award_bonus_fail_open_records_nothing() -> Result<()> {
        let (db, _referrer, referee) = setup_with_referral().await?;
        let oracle = FixedPrices::empty();

        let result =
            award_first_transaction_bonus(&db, &oracle, referee.id, 50.0, "bitcoin").await?;
        assert!(result.is_none());

        // Referral row untouched at zero
        let row = get_referral_received(&db, referee.id).await?.unwrap();
        assert_eq!(row.balance, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_validate_referral_code() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = create_custom_user(
            &db,
            "ref@example.com",
            Some("Ada"),
            Some("Lovelace"),
        )
        .await?;

        let info = validate_referral_code(&db, &referrer.referral_code)
            .await?
            .unwrap();
        assert_eq!(info.name, "Ada Lovelace");
        assert_eq!(info.code, referrer.referral_code);

        assert!(validate_referral_code(&db, "WRONGCOD").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_validate_referral_code_falls_back_to_email() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = create_test_user(&db, "plain@example.com").await?;

        let info = validate_referral_code(&db, &referrer.referral_code)
            .await?
            .unwrap();
        assert_eq!(info.name, "plain@example.com");

        Ok(())
    }
}
