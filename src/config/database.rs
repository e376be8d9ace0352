//! Database connection and table creation using SeaORM.
//!
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. Unique constraints (`auth_subject`,
//! `referral_code`, `referee_id`) come from the entity annotations.

use crate::entities::{Referral, Transaction, User, Wallet};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all database tables from the entity definitions.
///
/// Runs at every startup, so each statement carries `IF NOT EXISTS`.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(User);
    user_table.if_not_exists();
    let mut wallet_table = schema.create_table_from_entity(Wallet);
    wallet_table.if_not_exists();
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table.if_not_exists();
    let mut referral_table = schema.create_table_from_entity(Referral);
    referral_table.if_not_exists();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&wallet_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&referral_table)).await?;

    Ok(())
}
