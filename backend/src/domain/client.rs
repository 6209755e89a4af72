//! Client records owned by an identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{FieldError, optional_email, optional_phone, required_text};
use super::{ClientId, UserId};

/// Which side of the archive flag a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFilter {
    Active,
    Archived,
}

impl ArchiveFilter {
    /// Value of `is_archived` selected by this filter.
    #[must_use]
    pub const fn is_archived(self) -> bool {
        matches!(self, Self::Archived)
    }
}

/// Stored client.
///
/// ## Invariants
/// - `(owner_id, name)` is unique.
/// - `archived_at` is set exactly when `is_archived` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(value_type = String)]
    pub id: ClientId,
    #[schema(value_type = String)]
    pub owner_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Validated fields for a new client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<ClientRequest> for NewClient {
    type Error = FieldError;

    fn try_from(value: ClientRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_text(value.name, "name")?,
            email: optional_email(value.email, "email")?,
            phone: optional_phone(value.phone, "phone")?,
            address: value.address,
        })
    }
}

/// Allow-listed partial update. Unknown keys are rejected at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ClientPatch {
    /// Check the patch changes something and each present field is well formed.
    pub fn validate(self) -> Result<Self, FieldError> {
        if self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
        {
            return Err(FieldError::EmptyUpdate);
        }
        let name = match self.name {
            Some(name) => Some(required_text(Some(name), "name")?),
            None => None,
        };
        Ok(Self {
            name,
            email: optional_email(self.email, "email")?,
            phone: optional_phone(self.phone, "phone")?,
            address: self.address,
        })
    }

    /// Merge into `client`.
    pub fn apply(self, client: &mut Client) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(email) = self.email {
            client.email = Some(email);
        }
        if let Some(phone) = self.phone {
            client.phone = Some(phone);
        }
        if let Some(address) = self.address {
            client.address = Some(address);
        }
    }
}
