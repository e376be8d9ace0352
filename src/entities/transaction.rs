//! Transaction entity - An immutable ledger entry against a wallet.
//!
//! `kind` is stored as the canonical string of a
//! [`crate::core::transaction::TransactionKind`] (`"DEPOSIT"`, `"WITHDRAWAL"`,
//! `"REFERRAL_BONUS"`, `"INTEREST"`, `"ADMIN_ADJUSTMENT"`). `amount` is always
//! positive; the sign applied to the wallet balance is implied by the kind.
//! Rows are immutable once created except for deletion, which reverses their
//! balance effect.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the wallet this transaction belongs to
    pub wallet_id: i64,
    /// Canonical transaction kind string
    pub kind: String,
    /// Positive amount in the wallet's currency units
    pub amount: f64,
    /// When the transaction was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id"
    )]
    Wallet,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
