//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts to and from its domain
//! record; JSONB columns are decoded here.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{clients, delivery_notes, projects, users};
use crate::domain::ports::StoreError;
use crate::domain::{
    Client, ClientId, CompanyInfo, DeliveryNote, DeliveryNoteId, Email, LineItem, PersonalInfo,
    Project, ProjectId, Role, User, UserId,
};

pub(super) fn to_json<T: Serialize>(value: &T, column: &str) -> Result<Value, StoreError> {
    serde_json::to_value(value)
        .map_err(|err| StoreError::query(format!("encode {column}: {err}")))
}

fn from_json<T: DeserializeOwned>(value: Value, column: &str) -> Result<T, StoreError> {
    serde_json::from_value(value)
        .map_err(|err| StoreError::query(format!("decode {column}: {err}")))
}

fn optional_json<T: Serialize>(value: Option<&T>, column: &str) -> Result<Option<Value>, StoreError> {
    value.map(|inner| to_json(inner, column)).transpose()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Full users row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub validated: bool,
    pub validation_code: Option<String>,
    pub reset_token: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub invite_code: Option<String>,
    pub invited_by: Option<Uuid>,
    pub personal: Option<Value>,
    pub company: Option<Value>,
    pub role: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&User> for UserRow {
    type Error = StoreError;

    fn try_from(user: &User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *user.id.as_uuid(),
            email: user.email.to_string(),
            password_hash: user.password_hash.clone(),
            validated: user.validated,
            validation_code: user.validation_code.clone(),
            reset_token: user.reset_token.clone(),
            reset_expires_at: user.reset_expires_at,
            invite_code: user.invite_code.clone(),
            invited_by: user.invited_by.map(|id| *id.as_uuid()),
            personal: optional_json(user.personal.as_ref(), "personal")?,
            company: optional_json(user.company.as_ref(), "company")?,
            role: user.role.as_str().to_owned(),
            is_deleted: user.is_deleted,
            deleted_at: user.deleted_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|err| StoreError::query(format!("stored email for {}: {err}", row.id)))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| StoreError::query(format!("stored role for {}: {err}", row.id)))?;
        let personal: Option<PersonalInfo> = row
            .personal
            .map(|value| from_json(value, "personal"))
            .transpose()?;
        let company: Option<CompanyInfo> = row
            .company
            .map(|value| from_json(value, "company"))
            .transpose()?;
        Ok(Self {
            id: UserId::new(row.id),
            email,
            password_hash: row.password_hash,
            validated: row.validated,
            validation_code: row.validation_code,
            reset_token: row.reset_token,
            reset_expires_at: row.reset_expires_at,
            invite_code: row.invite_code,
            invited_by: row.invited_by.map(UserId::new),
            personal,
            company,
            role,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ClientRow {
    pub id: Uuid,
    pub owner_id: Uuid,
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

impl From<&Client> for ClientRow {
    fn from(client: &Client) -> Self {
        Self {
            id: *client.id.as_uuid(),
            owner_id: *client.owner_id.as_uuid(),
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            company_name: client.company_name.clone(),
            is_archived: client.is_archived,
            archived_at: client.archived_at,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            company_name: row.company_name,
            is_archived: row.is_archived,
            archived_at: row.archived_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            id: *project.id.as_uuid(),
            owner_id: *project.owner_id.as_uuid(),
            client_id: *project.client_id.as_uuid(),
            title: project.title.clone(),
            description: project.description.clone(),
            company_name: project.company_name.clone(),
            is_archived: project.is_archived,
            archived_at: project.archived_at,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            client_id: ClientId::new(row.client_id),
            title: row.title,
            description: row.description,
            company_name: row.company_name,
            is_archived: row.is_archived,
            archived_at: row.archived_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Delivery notes
// ---------------------------------------------------------------------------

/// Row struct for reading and inserting delivery notes. Lifecycle columns
/// are only written through conditional statements, never a changeset.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = delivery_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DeliveryNoteRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub owner_id: Uuid,
    pub items: Value,
    pub is_signed: bool,
    pub signature_url: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&DeliveryNote> for DeliveryNoteRow {
    type Error = StoreError;

    fn try_from(note: &DeliveryNote) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *note.id.as_uuid(),
            project_id: *note.project_id.as_uuid(),
            owner_id: *note.owner_id.as_uuid(),
            items: to_json(&note.items, "items")?,
            is_signed: note.is_signed,
            signature_url: note.signature_url.clone(),
            pdf_url: note.pdf_url.clone(),
            created_at: note.created_at,
        })
    }
}

impl TryFrom<DeliveryNoteRow> for DeliveryNote {
    type Error = StoreError;

    fn try_from(row: DeliveryNoteRow) -> Result<Self, Self::Error> {
        let items: Vec<LineItem> = from_json(row.items, "items")?;
        Ok(Self {
            id: DeliveryNoteId::new(row.id),
            project_id: ProjectId::new(row.project_id),
            owner_id: UserId::new(row.owner_id),
            items,
            is_signed: row.is_signed,
            signature_url: row.signature_url,
            pdf_url: row.pdf_url,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_user;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn user_row_keeps_profile_json() {
        let mut user = sample_user("ana@example.com");
        user.personal = Some(PersonalInfo {
            first_name: Some("Ana".to_owned()),
            ..PersonalInfo::default()
        });
        let row = UserRow::try_from(&user).expect("encode");
        assert_eq!(row.personal, Some(json!({
            "firstName": "Ana",
            "lastName": null,
            "phone": null,
            "nif": null
        })));
        assert_eq!(row.role, "user");

        let decoded = User::try_from(row).expect("decode");
        assert_eq!(decoded, user);
    }

    #[rstest]
    fn corrupt_role_is_a_query_error() {
        let user = sample_user("ana@example.com");
        let mut row = UserRow::try_from(&user).expect("encode");
        row.role = "root".to_owned();
        let err = User::try_from(row).expect_err("unknown role");
        assert!(matches!(err, StoreError::Query { .. }));
    }

    #[rstest]
    fn note_items_decode_from_tagged_json() {
        let row = DeliveryNoteRow {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            items: json!([
                { "type": "material", "description": "Tiles", "quantity": 40.0, "unitPrice": 1.5 }
            ]),
            is_signed: false,
            signature_url: None,
            pdf_url: None,
            created_at: Utc::now(),
        };
        let note = DeliveryNote::try_from(row).expect("decode");
        assert_eq!(
            note.items,
            vec![LineItem::Material {
                description: "Tiles".to_owned(),
                quantity: 40.0,
                unit_price: 1.5,
            }]
        );
    }
}
