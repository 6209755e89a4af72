//! PostgreSQL-backed [`UserRepository`].
//!
//! Soft-deleted rows stay in `users`; lookups used by login and reset only
//! consider live identities, while `email_exists` can be asked to include
//! the deleted ones for the email reuse policy. Every write after insert is
//! a single `UPDATE` naming only the columns it changes, guarded on
//! `is_deleted = false` and, for the one-time codes, on the code itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoreError, UserRepository};
use crate::domain::{CompanyInfo, Email, PersonalInfo, User, UserId};

use super::diesel_error_mapping::map_diesel_error;
use super::models::{UserRow, to_json};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: Option<UserRow>) -> Result<Option<User>, StoreError> {
    row.map(User::try_from).transpose()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let row = UserRow::try_from(user)?;
        let mut conn = self.pool.get().await?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert user"))?;
        Ok(())
    }

    async fn mark_validated(
        &self,
        id: &UserId,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false))
                .filter(users::validation_code.eq(code)),
        )
        .set((
            users::validated.eq(true),
            users::validation_code.eq(None::<String>),
            users::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "validate user"))?;
        Ok(updated > 0)
    }

    async fn set_reset_token(
        &self,
        id: &UserId,
        digest: &str,
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false)),
        )
        .set((
            users::reset_token.eq(digest),
            users::reset_expires_at.eq(expires_at),
            users::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "store reset token"))?;
        Ok(updated > 0)
    }

    async fn complete_reset(
        &self,
        id: &UserId,
        digest: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false))
                .filter(users::reset_token.eq(digest)),
        )
        .set((
            users::password_hash.eq(password_hash),
            users::reset_token.eq(None::<String>),
            users::reset_expires_at.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "reset password"))?;
        Ok(updated > 0)
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false)),
        )
        .set((
            users::password_hash.eq(password_hash),
            users::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "change password"))?;
        Ok(updated > 0)
    }

    async fn complete_invitation(
        &self,
        id: &UserId,
        invite_code: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false))
                .filter(users::invite_code.eq(invite_code)),
        )
        .set((
            users::password_hash.eq(password_hash),
            users::validated.eq(true),
            users::invite_code.eq(None::<String>),
            users::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "accept invitation"))?;
        Ok(updated > 0)
    }

    async fn set_personal(
        &self,
        id: &UserId,
        personal: &PersonalInfo,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let document = to_json(personal, "personal")?;
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false)),
        )
        .set((users::personal.eq(document), users::updated_at.eq(at)))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "update personal details"))?;
        Ok(updated > 0)
    }

    async fn set_company(
        &self,
        id: &UserId,
        company: &CompanyInfo,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let document = to_json(company, "company")?;
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false)),
        )
        .set((users::company.eq(document), users::updated_at.eq(at)))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "update company details"))?;
        Ok(updated > 0)
    }

    async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_deleted.eq(false)),
        )
        .set((
            users::is_deleted.eq(true),
            users::deleted_at.eq(at),
            users::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "soft-delete user"))?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user"))?;
        decode(row)
    }

    async fn find_active_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user by email"))?;
        decode(row)
    }

    async fn email_exists(&self, email: &Email, include_deleted: bool) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let mut query = users::table
            .filter(users::email.eq(email.as_ref()))
            .into_boxed();
        if !include_deleted {
            query = query.filter(users::is_deleted.eq(false));
        }
        let count: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "check email"))?;
        Ok(count > 0)
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = users::table
            .filter(users::reset_token.eq(digest))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user by reset token"))?;
        decode(row)
    }

    async fn find_by_invitation(
        &self,
        email: &Email,
        invite_code: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .filter(users::invite_code.eq(invite_code))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find invitation"))?;
        decode(row)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete user"))?;
        Ok(deleted > 0)
    }
}
