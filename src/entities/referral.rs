//! Referral entity - A referrer→referee relationship with its own USD ledger.
//!
//! At most one row ever exists per referee (`referee_id` is unique). `balance`
//! is a USD-denominated bonus amount for the referrer, independent of any
//! wallet balance and not backed by transactions. It is written exactly once,
//! when the referee's first transaction is recorded, if ever.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Referral database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
    /// Unique identifier for the referral
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who owns the referral code that was used
    pub referrer_id: i64,
    /// User who signed up with the code; unique, so a user can be referred at most once
    #[sea_orm(unique)]
    pub referee_id: i64,
    /// USD-denominated bonus accumulated for the referrer
    pub balance: f64,
    /// When the relationship was established
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Referral and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The referring user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReferrerId",
        to = "super::user::Column::Id"
    )]
    Referrer,
    /// The referred user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RefereeId",
        to = "super::user::Column::Id"
    )]
    Referee,
}

impl ActiveModelBehavior for ActiveModel {}
