//! User entity - One row per human account, created on first authenticated access.
//!
//! Each user carries the opaque identity-provider subject id (`auth_subject`),
//! profile fields, and a unique 8-character `referral_code` that other users can
//! supply at signup. Users are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Opaque subject id supplied by the external identity provider
    #[sea_orm(unique)]
    pub auth_subject: String,
    /// Primary email address
    pub email: String,
    /// Optional first name
    pub first_name: Option<String>,
    /// Optional last name
    pub last_name: Option<String>,
    /// Unique 8-character referral code, generated collision-checked
    #[sea_orm(unique)]
    pub referral_code: String,
    /// Whether this user can access the admin console
    pub is_admin: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many wallets
    #[sea_orm(has_many = "super::wallet::Entity")]
    Wallets,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Model {
    /// Display name for UI surfaces: "First Last", falling back to the email
    /// address when both name fields are empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
