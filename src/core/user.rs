//! User provisioning and profile updates.
//!
//! `ensure_user` is the single entry point for authenticated access: it
//! short-circuits when the subject is already known, which is also the guard
//! that makes referral establishment at-most-once per user. New accounts get
//! a unique 8-character referral code, regenerated on collision.

use crate::{
    core::referral::establish_referral,
    entities::{User, user},
    errors::{Error, Result},
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, prelude::*};

const REFERRAL_CODE_LEN: usize = 8;

/// One page of users plus the pagination context the admin console renders.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserPage {
    /// Users on this page, newest accounts first
    pub users: Vec<user::Model>,
    /// 1-based page number that was fetched
    pub current_page: u64,
    /// Total number of pages for this search
    pub total_pages: u64,
    /// Total number of matching users
    pub total_count: u64,
}

/// Finds a user by the opaque identity-provider subject id.
pub async fn get_user_by_subject(
    db: &DatabaseConnection,
    auth_subject: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::AuthSubject.eq(auth_subject))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by their unique ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Lists users for the admin console, newest first, with pagination and an
/// optional search term matched against email, name fields, and the auth
/// subject.
///
/// `page` is 1-based; a blank search term means no filter.
pub async fn list_users(
    db: &DatabaseConnection,
    page: u64,
    per_page: u64,
    search: Option<&str>,
) -> Result<UserPage> {
    let per_page = per_page.max(1);
    let page = page.max(1);

    let mut query = User::find();
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{term}%");
        query = query.filter(
            Condition::any()
                .add(user::Column::Email.like(&pattern))
                .add(user::Column::FirstName.like(&pattern))
                .add(user::Column::LastName.like(&pattern))
                .add(user::Column::AuthSubject.like(&pattern)),
        );
    }

    let paginator = query
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(db, per_page);

    let total_count = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    let users = paginator.fetch_page(page - 1).await?;

    Ok(UserPage {
        users,
        current_page: page,
        total_pages,
        total_count,
    })
}

/// Looks up the user for an authenticated subject, creating the account on
/// first access.
///
/// An existing subject returns immediately; nothing else runs, so a referral
/// code supplied on a later visit is ignored. A new account is created with a
/// fresh referral code, and the supplied code (if any) establishes the
/// referral relationship. Bad codes are silently ignored; signup never fails
/// because of one.
pub async fn ensure_user(
    db: &DatabaseConnection,
    auth_subject: &str,
    email: &str,
    first_name: Option<String>,
    last_name: Option<String>,
    referral_code: Option<&str>,
) -> Result<user::Model> {
    if let Some(existing) = get_user_by_subject(db, auth_subject).await? {
        return Ok(existing);
    }

    let code = generate_referral_code(db).await?;

    let row = user::ActiveModel {
        auth_subject: Set(auth_subject.to_string()),
        email: Set(email.to_string()),
        first_name: Set(first_name),
        last_name: Set(last_name),
        referral_code: Set(code),
        is_admin: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = row.insert(db).await?;

    establish_referral(db, created.id, referral_code).await?;

    tracing::info!(user_id = created.id, "user created on first access");
    Ok(created)
}

/// Partially updates a user's profile fields.
///
/// A referral code that is already taken by another user is rejected as a
/// validation error, not an opaque failure.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
    referral_code: Option<String>,
) -> Result<user::Model> {
    let existing = get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })?;

    if let Some(code) = &referral_code {
        let taken = User::find()
            .filter(user::Column::ReferralCode.eq(code.as_str()))
            .filter(user::Column::Id.ne(user_id))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(Error::DuplicateReferralCode { code: code.clone() });
        }
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(first) = first_name {
        active.first_name = Set(Some(first));
    }
    if let Some(last) = last_name {
        active.last_name = Set(Some(last));
    }
    if let Some(code) = referral_code {
        active.referral_code = Set(code);
    }

    active.update(db).await.map_err(Into::into)
}

/// Generates an 8-character alphanumeric referral code that no existing user
/// holds, retrying on collision.
async fn generate_referral_code(db: &DatabaseConnection) -> Result<String> {
    loop {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(REFERRAL_CODE_LEN)
            .map(char::from)
            .collect();

        let taken = User::find()
            .filter(user::Column::ReferralCode.eq(code.as_str()))
            .one(db)
            .await?;

        if taken.is_none() {
            return Ok(code);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Referral;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_ensure_user_creates_with_referral_code() -> Result<()> {
        let db = setup_test_db().await?;

        let user = ensure_user(
            &db,
            "subject-1",
            "alice@example.com",
            Some("Alice".to_string()),
            None,
            None,
        )
        .await?;

        assert_eq!(user.auth_subject, "subject-1");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.referral_code.len(), REFERRAL_CODE_LEN);
        assert!(!user.is_admin);

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_user_short_circuits_existing_subject() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = create_test_user(&db, "referrer@example.com").await?;

        let first = ensure_user(&db, "subject-1", "bob@example.com", None, None, None).await?;

        // Second call with a valid code: user already exists, no referral is
        // established and the stored fields are unchanged.
        let second = ensure_user(
            &db,
            "subject-1",
            "different@example.com",
            None,
            None,
            Some(&referrer.referral_code),
        )
        .await?;

        assert_eq!(second.id, first.id);
        assert_eq!(second.email, "bob@example.com");
        assert_eq!(Referral::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_user_establishes_referral_at_signup() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = create_test_user(&db, "referrer@example.com").await?;

        let referee = ensure_user(
            &db,
            "subject-2",
            "referee@example.com",
            None,
            None,
            Some(&referrer.referral_code),
        )
        .await?;

        let rows = Referral::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].referrer_id, referrer.id);
        assert_eq!(rows[0].referee_id, referee.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_user_survives_bad_referral_code() -> Result<()> {
        let db = setup_test_db().await?;

        let user = ensure_user(
            &db,
            "subject-3",
            "carol@example.com",
            None,
            None,
            Some("DOESNTEX"),
        )
        .await?;

        assert_eq!(user.email, "carol@example.com");
        assert_eq!(Referral::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_referral_codes_are_unique_across_users() -> Result<()> {
        let db = setup_test_db().await?;

        let mut codes = std::collections::HashSet::new();
        for i in 0..20 {
            let user = ensure_user(
                &db,
                &format!("subject-{i}"),
                &format!("user{i}@example.com"),
                None,
                None,
                None,
            )
            .await?;
            assert!(codes.insert(user.referral_code));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_partial() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let updated =
            update_profile(&db, user.id, Some("New".to_string()), None, None).await?;

        assert_eq!(updated.first_name.as_deref(), Some("New"));
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.referral_code, user.referral_code);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_rejects_duplicate_code() -> Result<()> {
        let db = setup_test_db().await?;
        let user_a = create_test_user(&db, "a@example.com").await?;
        let user_b = create_test_user(&db, "b@example.com").await?;

        let result = update_profile(
            &db,
            user_b.id,
            None,
            None,
            Some(user_a.referral_code.clone()),
        )
        .await;

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateReferralCode { code: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_allows_keeping_own_code() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let updated = update_profile(
            &db,
            user.id,
            None,
            None,
            Some(user.referral_code.clone()),
        )
        .await?;

        assert_eq!(updated.referral_code, user.referral_code);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_profile(&db, 999, None, None, None).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { id: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_users_paginates() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 0..7 {
            create_test_user(&db, &format!("user{i}@example.com")).await?;
        }

        let first = list_users(&db, 1, 3, None).await?;
        assert_eq!(first.users.len(), 3);
        assert_eq!(first.total_count, 7);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.current_page, 1);

        let last = list_users(&db, 3, 3, None).await?;
        assert_eq!(last.users.len(), 1);

        // Newest account first, no overlap between pages
        assert!(first.users[0].id > first.users[2].id);
        assert!(first.users.iter().all(|u| u.id != last.users[0].id));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_users_search_matches_email_and_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_user(&db, "ada@example.com", Some("Ada"), Some("Lovelace")).await?;
        create_custom_user(&db, "grace@example.com", Some("Grace"), Some("Hopper")).await?;
        create_test_user(&db, "plain@example.com").await?;

        let by_email = list_users(&db, 1, 10, Some("grace@")).await?;
        assert_eq!(by_email.total_count, 1);
        assert_eq!(by_email.users[0].email, "grace@example.com");

        let by_name = list_users(&db, 1, 10, Some("Lovelace")).await?;
        assert_eq!(by_name.total_count, 1);
        assert_eq!(by_name.users[0].email, "ada@example.com");

        let blank = list_users(&db, 1, 10, Some("   ")).await?;
        assert_eq!(blank.total_count, 3);

        let none = list_users(&db, 1, 10, Some("nomatch")).await?;
        assert_eq!(none.total_count, 0);
        assert!(none.users.is_empty());

        Ok(())
    }
}
