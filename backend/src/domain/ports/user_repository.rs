//! Port abstraction for identity persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StoreError;
use crate::domain::{CompanyInfo, Email, PersonalInfo, User, UserId};

/// Identity storage.
///
/// Lookups by email, reset token or invitation only see identities that are
/// not soft-deleted; [`UserRepository::find_by_id`] sees every row so the
/// access gate can tell deleted accounts apart from unknown ones.
///
/// Writes after insert touch only the columns they name and stamp
/// `updated_at`. Each returns false when no live row matched its guard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new identity. Fails with [`StoreError::Duplicate`] when the
    /// email is taken by a non-deleted identity.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Mark the identity validated and clear its code, provided the stored
    /// code still equals `code`.
    async fn mark_validated(
        &self,
        id: &UserId,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Store a reset-token digest and its expiry.
    async fn set_reset_token(
        &self,
        id: &UserId,
        digest: &str,
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Replace the password hash and clear the reset token, provided the
    /// stored digest still equals `digest`.
    async fn complete_reset(
        &self,
        id: &UserId,
        digest: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Replace the password hash.
    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Set the password, validate the identity and clear the invite code,
    /// provided the stored code still equals `invite_code`.
    async fn complete_invitation(
        &self,
        id: &UserId,
        invite_code: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Replace the personal details document.
    async fn set_personal(
        &self,
        id: &UserId,
        personal: &PersonalInfo,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Replace the company details document.
    async fn set_company(
        &self,
        id: &UserId,
        company: &CompanyInfo,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Flag the identity deleted at `at`.
    async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Fetch by identifier, including soft-deleted rows.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Fetch the non-deleted identity with this email.
    async fn find_active_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Whether any row holds this email. Soft-deleted rows count only when
    /// `include_deleted` is true.
    async fn email_exists(&self, email: &Email, include_deleted: bool)
    -> Result<bool, StoreError>;

    /// Fetch the non-deleted identity holding this reset-token digest.
    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, StoreError>;

    /// Fetch the non-deleted identity with this email and invite code.
    async fn find_by_invitation(
        &self,
        email: &Email,
        invite_code: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Remove the row. Returns false when nothing was deleted.
    async fn delete(&self, id: &UserId) -> Result<bool, StoreError>;
}
