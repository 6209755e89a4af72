//! Field-level validation shared by resource payloads.

use serde_json::json;

use super::{Email, Error, validate_phone};

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Required field absent or blank.
    Missing(&'static str),
    /// Field present but not an email address.
    InvalidEmail(&'static str),
    /// Field present but not a phone number.
    InvalidPhone(&'static str),
    /// An update payload that changes nothing.
    EmptyUpdate,
}

impl FieldError {
    fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing(field) | Self::InvalidEmail(field) | Self::InvalidPhone(field) => {
                Some(field)
            }
            Self::EmptyUpdate => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "missing_field",
            Self::InvalidEmail(_) => "invalid_email",
            Self::InvalidPhone(_) => "invalid_phone",
            Self::EmptyUpdate => "empty_update",
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing required field: {field}"),
            Self::InvalidEmail(field) => write!(f, "{field} must be a valid email address"),
            Self::InvalidPhone(field) => write!(f, "{field} must contain 8 to 15 digits"),
            Self::EmptyUpdate => write!(f, "update payload must change at least one field"),
        }
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        let details = match value.field() {
            Some(field) => json!({ "field": field, "code": value.code() }),
            None => json!({ "code": value.code() }),
        };
        Self::invalid_request(value.to_string()).with_details(details)
    }
}

/// Trim `value` and require it to be non-empty.
pub fn required_text(value: Option<String>, field: &'static str) -> Result<String, FieldError> {
    match value.map(|raw| raw.trim().to_owned()) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(FieldError::Missing(field)),
    }
}

/// Normalise an optional email field.
pub fn optional_email(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, FieldError> {
    value
        .map(|raw| {
            Email::parse(&raw)
                .map(String::from)
                .map_err(|_| FieldError::InvalidEmail(field))
        })
        .transpose()
}

/// Check an optional phone field.
pub fn optional_phone(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, FieldError> {
    value
        .map(|raw| {
            validate_phone(&raw)
                .map(|()| raw)
                .map_err(|_| FieldError::InvalidPhone(field))
        })
        .transpose()
}
