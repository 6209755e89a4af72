//! Project records owned by an identity and attached to one of its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{FieldError, required_text};
use super::{ClientId, ProjectId, UserId};

/// Stored project.
///
/// ## Invariants
/// - `(owner_id, client_id, title)` is unique.
/// - `client_id` references a client with the same owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[schema(value_type = String)]
    pub id: ProjectId,
    #[schema(value_type = String)]
    pub owner_id: UserId,
    #[schema(value_type = String)]
    pub client_id: ClientId,
    pub title: String,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create payload. `client` is the referenced client id.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client: Option<Uuid>,
}

/// Validated fields for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub client_id: ClientId,
}

impl TryFrom<ProjectRequest> for NewProject {
    type Error = FieldError;

    fn try_from(value: ProjectRequest) -> Result<Self, Self::Error> {
        let title = required_text(value.title, "title")?;
        let client_id = value
            .client
            .map(ClientId::new)
            .ok_or(FieldError::Missing("client"))?;
        Ok(Self {
            title,
            description: value.description,
            client_id,
        })
    }
}

/// Allow-listed partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    /// Reject empty patches and blank titles.
    pub fn validate(self) -> Result<Self, FieldError> {
        if self.title.is_none() && self.description.is_none() {
            return Err(FieldError::EmptyUpdate);
        }
        let title = match self.title {
            Some(title) => Some(required_text(Some(title), "title")?),
            None => None,
        };
        Ok(Self {
            title,
            description: self.description,
        })
    }

    /// Merge into `project`.
    pub fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = Some(description);
        }
    }
}
