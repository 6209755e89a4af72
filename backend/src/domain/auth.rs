//! Authentication primitives: credentials, passwords and bearer tokens.
//!
//! Inbound adapters build these from raw request strings so services only
//! ever see validated values. Secrets are held in [`Zeroizing`] buffers.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{Email, UserValidationError};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    MissingEmail,
    /// Email did not look like an address.
    InvalidEmail,
    /// Password was empty.
    MissingPassword,
    /// Password is shorter than [`PASSWORD_MIN_LENGTH`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEmail => write!(f, "email is required"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::MissingPassword => write!(f, "password is required"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::EmptyEmail => Self::MissingEmail,
            _ => Self::InvalidEmail,
        }
    }
}

/// Plain-text password held in a zeroizing buffer.
///
/// Whitespace is preserved; only emptiness and, for new passwords, length
/// are checked.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password. Used for verifying existing secrets.
    pub fn existing(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::MissingPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a password that is about to be stored.
    pub fn new_secret(raw: &str) -> Result<Self, CredentialsValidationError> {
        let password = Self::existing(raw)?;
        if raw.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }
        Ok(password)
    }

    /// Password text.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Validated email and password pair.
///
/// # Examples
/// ```
/// use albaran::domain::Credentials;
///
/// let creds = Credentials::for_registration(" Ana@Example.com ", "secret1").unwrap();
/// assert_eq!(creds.email().as_ref(), "ana@example.com");
/// assert_eq!(creds.password().expose(), "secret1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: Email,
    password: Password,
}

impl Credentials {
    /// Credentials presented at login. The password length is not checked.
    pub fn for_login(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: Email::parse(email)?,
            password: Password::existing(password)?,
        })
    }

    /// Credentials for a new account; the password must meet the length rule.
    pub fn for_registration(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: Email::parse(email)?,
            password: Password::new_secret(password)?,
        })
    }

    /// Normalised email.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Signed, time-limited bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BearerToken {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}
