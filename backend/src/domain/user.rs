//! Identity data model.
//!
//! A [`User`] is the stored identity record. It carries credential material
//! (password hash, one-time codes) and must never be serialised directly;
//! adapters expose [`UserProfile`] instead.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors for identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail,
    InvalidPhone,
    UnknownRole(String),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::InvalidPhone => write!(f, "phone must contain 8 to 15 digits"),
            Self::UnknownRole(role) => write!(f, "unknown role: {role}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable identity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9]{8,15}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Check a phone number against the accepted format: optional `+` and 8 to
/// 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), UserValidationError> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(UserValidationError::InvalidPhone)
    }
}

/// Normalised email address.
///
/// ## Invariants
/// - Trimmed and lowercased.
/// - Matches `local@domain.tld` loosely (no whitespace, one `@`, a dot in the
///   domain part).
///
/// # Examples
/// ```
/// use albaran::domain::Email;
///
/// let email = Email::parse("  Ana@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ana@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise raw input.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Personal details attached to an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub nif: Option<String>,
}

/// Company details attached to an identity and stamped onto its resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: Option<String>,
    pub cif: Option<String>,
    pub address: Option<String>,
}

/// Allow-listed update for [`PersonalInfo`]. Absent fields are left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonalInfoPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub nif: Option<String>,
}

impl PersonalInfoPatch {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.nif.is_none()
    }

    /// Merge into `target`.
    pub fn apply(self, target: &mut PersonalInfo) {
        if let Some(value) = self.first_name {
            target.first_name = Some(value);
        }
        if let Some(value) = self.last_name {
            target.last_name = Some(value);
        }
        if let Some(value) = self.phone {
            target.phone = Some(value);
        }
        if let Some(value) = self.nif {
            target.nif = Some(value);
        }
    }
}

/// Allow-listed update for [`CompanyInfo`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyInfoPatch {
    pub name: Option<String>,
    pub cif: Option<String>,
    pub address: Option<String>,
}

impl CompanyInfoPatch {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cif.is_none() && self.address.is_none()
    }

    /// Merge into `target`.
    pub fn apply(self, target: &mut CompanyInfo) {
        if let Some(value) = self.name {
            target.name = Some(value);
        }
        if let Some(value) = self.cif {
            target.cif = Some(value);
        }
        if let Some(value) = self.address {
            target.address = Some(value);
        }
    }
}

/// Stored identity record.
///
/// ## Invariants
/// - `email` is unique among non-deleted identities.
/// - `reset_token` holds a digest of the emailed token, never the token.
/// - `reset_token` and `reset_expires_at` are set and cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub validated: bool,
    pub validation_code: Option<String>,
    pub reset_token: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub invite_code: Option<String>,
    pub invited_by: Option<UserId>,
    pub personal: Option<PersonalInfo>,
    pub company: Option<CompanyInfo>,
    pub role: Role,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Company name stamped onto clients and projects created by this user.
    #[must_use]
    pub fn company_name(&self) -> Option<String> {
        self.company.as_ref().and_then(|company| company.name.clone())
    }
}

/// Public view of an identity without credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    #[schema(value_type = String, example = "ana@example.com")]
    pub email: Email,
    pub validated: bool,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal: Option<PersonalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub invited_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            validated: user.validated,
            role: user.role,
            personal: user.personal.clone(),
            company: user.company.clone(),
            invited_by: user.invited_by,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests;
