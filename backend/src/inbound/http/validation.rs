//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{CredentialsValidationError, Email, Error, FieldError, Password};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidEmail,
    PasswordTooShort,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordTooShort => "password_too_short",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    FieldError::Missing(field.as_str()).into()
}

/// Require a present, non-blank string field.
pub(crate) fn required(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Map credential validation failures to field errors. `password_field` names
/// the JSON key the password came from.
pub(crate) fn credentials_error(
    err: CredentialsValidationError,
    password_field: FieldName,
) -> Error {
    let message = err.to_string();
    match err {
        CredentialsValidationError::MissingEmail => missing_field_error(EMAIL),
        CredentialsValidationError::InvalidEmail => {
            field_error(EMAIL, ErrorCode::InvalidEmail, message)
        }
        CredentialsValidationError::MissingPassword => missing_field_error(password_field),
        CredentialsValidationError::PasswordTooShort { .. } => {
            field_error(password_field, ErrorCode::PasswordTooShort, message)
        }
    }
}

pub(crate) fn parse_email(value: Option<String>, field: FieldName) -> Result<Email, Error> {
    let raw = required(value, field)?;
    Email::parse(&raw).map_err(|err| field_error(field, ErrorCode::InvalidEmail, err.to_string()))
}

/// A password about to be stored.
pub(crate) fn new_password(value: Option<String>, field: FieldName) -> Result<Password, Error> {
    let raw = value.unwrap_or_default();
    Password::new_secret(&raw).map_err(|err| credentials_error(err, field))
}

/// A password checked against a stored hash.
pub(crate) fn existing_password(
    value: Option<String>,
    field: FieldName,
) -> Result<Password, Error> {
    let raw = value.unwrap_or_default();
    Password::existing(&raw).map_err(|err| credentials_error(err, field))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None)]
    #[case(Some("   ".to_owned()))]
    fn required_rejects_blank(#[case] value: Option<String>) {
        let error = required(value, FieldName::new("code")).expect_err("blank");
        assert_eq!(error.reason(), Some("missing_field"));
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&json!("code"))
        );
    }

    #[rstest]
    #[case(CredentialsValidationError::MissingEmail, "email", "missing_field")]
    #[case(CredentialsValidationError::InvalidEmail, "email", "invalid_email")]
    #[case(CredentialsValidationError::MissingPassword, "newPassword", "missing_field")]
    #[case(
        CredentialsValidationError::PasswordTooShort { min: 6 },
        "newPassword",
        "password_too_short"
    )]
    fn credential_errors_name_the_field(
        #[case] err: CredentialsValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let error = credentials_error(err, FieldName::new("newPassword"));
        let details = error.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], code);
    }

    #[test]
    fn new_password_enforces_length() {
        let error = new_password(Some("abc".to_owned()), PASSWORD).expect_err("short");
        assert_eq!(error.reason(), Some("password_too_short"));
        assert!(new_password(Some("abcdef".to_owned()), PASSWORD).is_ok());
    }

    #[test]
    fn parse_email_normalises() {
        let email = parse_email(Some(" Ana@Example.COM ".to_owned()), EMAIL).expect("email");
        assert_eq!(email.as_ref(), "ana@example.com");
    }
}
