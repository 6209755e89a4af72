//! Driving port for account lifecycle use-cases.
//!
//! Inbound adapters call this port for registration, login, one-time codes,
//! invitations and profile maintenance without touching persistence, hashing
//! or mail delivery directly.

use async_trait::async_trait;

use crate::domain::{
    BearerToken, CompanyInfo, CompanyInfoPatch, Credentials, Email, Error, Password, PersonalInfo,
    PersonalInfoPatch, User, UserProfile,
};

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an unvalidated identity, email its validation code and return
    /// a bearer credential.
    async fn register(&self, credentials: Credentials) -> Result<BearerToken, Error>;

    /// Exchange credentials for a bearer credential.
    async fn login(&self, credentials: Credentials) -> Result<BearerToken, Error>;

    /// Consume the emailed validation code.
    async fn validate_email(&self, user: &User, code: &str) -> Result<(), Error>;

    /// Email a reset link if `email` belongs to an identity. Always succeeds
    /// from the caller's point of view.
    async fn request_password_reset(&self, email: &str) -> Result<(), Error>;

    /// Replace the password using an emailed reset token.
    async fn reset_password(&self, token: &str, new_password: Password) -> Result<(), Error>;

    /// Replace the password after checking the current one.
    async fn change_password(
        &self,
        user: &User,
        current: Password,
        new_password: Password,
    ) -> Result<(), Error>;

    /// Create a shell identity for `email` and send it an invitation.
    async fn invite(&self, inviter: &User, email: Email) -> Result<UserProfile, Error>;

    /// Activate an invited identity with its chosen password.
    async fn accept_invitation(
        &self,
        email: Email,
        invite_code: &str,
        password: Password,
    ) -> Result<BearerToken, Error>;

    async fn update_personal(
        &self,
        user: &User,
        patch: PersonalInfoPatch,
    ) -> Result<PersonalInfo, Error>;

    async fn update_company(
        &self,
        user: &User,
        patch: CompanyInfoPatch,
    ) -> Result<CompanyInfo, Error>;

    /// Flag the identity as deleted; it keeps its row and resources.
    async fn soft_delete(&self, user: &User) -> Result<(), Error>;

    /// Remove the identity row. Fails while it still owns resources.
    async fn hard_delete(&self, user: &User) -> Result<(), Error>;
}
