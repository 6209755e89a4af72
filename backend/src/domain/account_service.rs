//! Account lifecycle service.
//!
//! Implements [`AccountCommand`]: registration, login, email validation,
//! password reset and change, invitations and profile maintenance. Emails go
//! out through the [`Notifier`] port and never block or fail a request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::codes;
use super::validation::{FieldError, optional_phone};
use crate::domain::ports::{
    AccountCommand, HasherError, Notifier, PasswordHasher, TokenError, TokenService,
    UserRepository,
};
use crate::domain::{
    BearerToken, CompanyInfo, CompanyInfoPatch, Credentials, Email, EmailReusePolicy, Error,
    FrontendLinks, OutboundEmail, Password, PersonalInfo, PersonalInfoPatch, Role, User, UserId,
    UserProfile,
};

/// How long an emailed reset link stays valid.
pub const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

fn map_hasher_error(error: HasherError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_token_error(error: TokenError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

fn account_gone() -> Error {
    Error::forbidden("account has been deleted")
}

fn invalid_code() -> Error {
    Error::invalid_request("validation code does not match")
        .with_details(json!({ "code": "invalid_code" }))
}

fn invalid_credentials() -> Error {
    Error::invalid_request("invalid credentials").with_details(json!({ "code": "invalid_credentials" }))
}

/// Collaborators required by [`AccountService`].
#[derive(Clone)]
pub struct AccountServiceDeps {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub notifier: Arc<dyn Notifier>,
    pub links: FrontendLinks,
    pub clock: Arc<dyn Clock>,
    pub email_reuse: EmailReusePolicy,
}

/// Account service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    notifier: Arc<dyn Notifier>,
    links: FrontendLinks,
    clock: Arc<dyn Clock>,
    email_reuse: EmailReusePolicy,
}

impl AccountService {
    pub fn new(deps: AccountServiceDeps) -> Self {
        let AccountServiceDeps {
            users,
            hasher,
            tokens,
            notifier,
            links,
            clock,
            email_reuse,
        } = deps;
        Self {
            users,
            hasher,
            tokens,
            notifier,
            links,
            clock,
            email_reuse,
        }
    }

    fn issue_token(&self, user: &UserId, now: DateTime<Utc>) -> Result<BearerToken, Error> {
        self.tokens.issue(user, now).map_err(map_token_error)
    }

    async fn ensure_email_available(&self, email: &Email) -> Result<(), Error> {
        if self
            .users
            .email_exists(email, self.email_reuse.counts_deleted())
            .await?
        {
            return Err(Error::conflict("email is already registered"));
        }
        Ok(())
    }

    fn new_identity(&self, email: Email, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: UserId::random(),
            email,
            password_hash,
            validated: false,
            validation_code: None,
            reset_token: None,
            reset_expires_at: None,
            invite_code: None,
            invited_by: None,
            personal: None,
            company: None,
            role: Role::User,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn register(&self, credentials: Credentials) -> Result<BearerToken, Error> {
        self.ensure_email_available(credentials.email()).await?;

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hasher_error)?;
        let code = codes::validation_code();
        let now = self.clock.utc();
        let mut user = self.new_identity(credentials.email().clone(), password_hash, now);
        user.validation_code = Some(code.clone());

        self.users.insert(&user).await?;
        info!(user_id = %user.id, "identity registered");

        self.notifier
            .dispatch(OutboundEmail::verification(user.email.clone(), &code));
        self.issue_token(&user.id, now)
    }

    async fn login(&self, credentials: Credentials) -> Result<BearerToken, Error> {
        let Some(user) = self.users.find_active_by_email(credentials.email()).await? else {
            return Err(invalid_credentials());
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            return Err(invalid_credentials());
        }
        if !user.validated {
            return Err(Error::forbidden("email address has not been validated"));
        }
        self.issue_token(&user.id, self.clock.utc())
    }

    async fn validate_email(&self, user: &User, code: &str) -> Result<(), Error> {
        if user.validation_code.as_deref() != Some(code) {
            return Err(invalid_code());
        }
        if !self.users.mark_validated(&user.id, code, self.clock.utc()).await? {
            return Err(invalid_code());
        }
        info!(user_id = %user.id, "email validated");
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let Ok(email) = Email::parse(email) else {
            debug!("password reset requested for malformed email");
            return Ok(());
        };
        let Some(user) = self.users.find_active_by_email(&email).await? else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = codes::reset_token();
        let now = self.clock.utc();
        let expires_at = now + Duration::seconds(RESET_TOKEN_TTL_SECS);
        if !self
            .users
            .set_reset_token(&user.id, &codes::digest_token(&token), expires_at, now)
            .await?
        {
            debug!(user_id = %user.id, "identity deleted before reset token was stored");
            return Ok(());
        }

        let link = self.links.password_reset(&token);
        self.notifier
            .dispatch(OutboundEmail::password_reset(user.email.clone(), &link));
        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: Password) -> Result<(), Error> {
        let invalid_token = || {
            Error::invalid_request("reset token is invalid or has expired")
                .with_details(json!({ "code": "invalid_or_expired_token" }))
        };
        let now = self.clock.utc();
        let digest = codes::digest_token(token);
        let candidate = self.users.find_by_reset_digest(&digest).await?;
        let Some(user) = candidate
            .filter(|user| user.reset_expires_at.is_some_and(|expires| now < expires))
        else {
            return Err(invalid_token());
        };

        let password_hash = self
            .hasher
            .hash(&new_password)
            .await
            .map_err(map_hasher_error)?;
        if !self
            .users
            .complete_reset(&user.id, &digest, &password_hash, now)
            .await?
        {
            return Err(invalid_token());
        }
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    async fn change_password(
        &self,
        user: &User,
        current: Password,
        new_password: Password,
    ) -> Result<(), Error> {
        let verified = self
            .hasher
            .verify(&current, &user.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            return Err(invalid_credentials());
        }
        let password_hash = self
            .hasher
            .hash(&new_password)
            .await
            .map_err(map_hasher_error)?;
        if !self
            .users
            .set_password_hash(&user.id, &password_hash, self.clock.utc())
            .await?
        {
            return Err(account_gone());
        }
        Ok(())
    }

    async fn invite(&self, inviter: &User, email: Email) -> Result<UserProfile, Error> {
        self.ensure_email_available(&email).await?;

        let code = codes::invite_code();
        let placeholder = Password::existing(&code).map_err(|err| Error::internal(err.to_string()))?;
        let password_hash = self
            .hasher
            .hash(&placeholder)
            .await
            .map_err(map_hasher_error)?;
        let now = self.clock.utc();
        let mut invited = self.new_identity(email, password_hash, now);
        invited.invite_code = Some(code.clone());
        invited.invited_by = Some(inviter.id);
        invited.company = inviter.company.clone();

        self.users.insert(&invited).await?;
        info!(user_id = %invited.id, invited_by = %inviter.id, "identity invited");

        let link = self.links.invitation(&invited.email, &code);
        self.notifier.dispatch(OutboundEmail::invitation(
            invited.email.clone(),
            &link,
            &inviter.email,
        ));
        Ok(UserProfile::from(&invited))
    }

    async fn accept_invitation(
        &self,
        email: Email,
        invite_code: &str,
        password: Password,
    ) -> Result<BearerToken, Error> {
        let invalid_invitation = || {
            Error::invalid_request("invitation is invalid")
                .with_details(json!({ "code": "invalid_invitation" }))
        };
        let Some(user) = self.users.find_by_invitation(&email, invite_code).await? else {
            return Err(invalid_invitation());
        };

        let password_hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(map_hasher_error)?;
        let now = self.clock.utc();
        if !self
            .users
            .complete_invitation(&user.id, invite_code, &password_hash, now)
            .await?
        {
            return Err(invalid_invitation());
        }
        info!(user_id = %user.id, "invitation accepted");
        self.issue_token(&user.id, now)
    }

    async fn update_personal(
        &self,
        user: &User,
        patch: PersonalInfoPatch,
    ) -> Result<PersonalInfo, Error> {
        if patch.is_empty() {
            return Err(FieldError::EmptyUpdate.into());
        }
        let phone = optional_phone(patch.phone.clone(), "phone")?;
        let mut personal = user.personal.clone().unwrap_or_default();
        PersonalInfoPatch { phone, ..patch }.apply(&mut personal);

        if !self
            .users
            .set_personal(&user.id, &personal, self.clock.utc())
            .await?
        {
            return Err(account_gone());
        }
        Ok(personal)
    }

    async fn update_company(
        &self,
        user: &User,
        patch: CompanyInfoPatch,
    ) -> Result<CompanyInfo, Error> {
        if patch.is_empty() {
            return Err(FieldError::EmptyUpdate.into());
        }
        let mut company = user.company.clone().unwrap_or_default();
        patch.apply(&mut company);

        if !self
            .users
            .set_company(&user.id, &company, self.clock.utc())
            .await?
        {
            return Err(account_gone());
        }
        Ok(company)
    }

    async fn soft_delete(&self, user: &User) -> Result<(), Error> {
        if !self.users.soft_delete(&user.id, self.clock.utc()).await? {
            return Err(account_gone());
        }
        info!(user_id = %user.id, "identity soft-deleted");
        Ok(())
    }

    async fn hard_delete(&self, user: &User) -> Result<(), Error> {
        if !self.users.delete(&user.id).await? {
            return Err(Error::not_found("user not found"));
        }
        info!(user_id = %user.id, "identity removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
