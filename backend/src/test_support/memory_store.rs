//! In-memory repository implementing every persistence port.
//!
//! Mirrors the storage rules of the PostgreSQL schema: unique indexes, the
//! partial unique index on active emails, `ON DELETE RESTRICT` foreign keys
//! and the conditional sign/delete statements.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ClientRepository, DeleteOutcome, DeliveryNoteRepository, ProjectRepository, SignOutcome,
    StoreError, UserRepository,
};
use crate::domain::{
    ArchiveFilter, Client, ClientId, CompanyInfo, DeliveryNote, DeliveryNoteId, Email,
    PersonalInfo, Project, ProjectId, User, UserId,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    clients: Vec<Client>,
    projects: Vec<Project>,
    notes: Vec<DeliveryNote>,
}

/// Shared in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Connection`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed an identity directly, bypassing uniqueness checks.
    pub fn put_user(&self, user: User) {
        self.lock().users.push(user);
    }

    /// Look up the non-deleted identity with this email.
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.lock()
            .users
            .iter()
            .find(|user| user.email.as_ref() == email && !user.is_deleted)
            .cloned()
    }

    pub fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.iter().find(|user| user.id == *id).cloned()
    }

    pub fn note(&self, id: &DeliveryNoteId) -> Option<DeliveryNote> {
        self.lock().notes.iter().find(|note| note.id == *id).cloned()
    }

    pub fn client_count(&self) -> usize {
        self.lock().clients.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory store mutex"),
        }
    }

    /// Apply `change` to the live identity `id` when `matches` holds.
    fn touch_user(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
        matches: impl Fn(&User) -> bool,
        change: impl FnOnce(&mut User),
    ) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        let Some(user) = state
            .users
            .iter_mut()
            .find(|user| user.id == *id && !user.is_deleted && matches(user))
        else {
            return Ok(false);
        };
        change(user);
        user.updated_at = at;
        Ok(true)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::connection("in-memory store marked unavailable"));
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.guard()?;
        if state
            .users
            .iter()
            .any(|existing| existing.email == user.email && !existing.is_deleted)
        {
            return Err(StoreError::duplicate("users_email_active_key"));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn mark_validated(
        &self,
        id: &UserId,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(
            id,
            at,
            |user| user.validation_code.as_deref() == Some(code),
            |user| {
                user.validated = true;
                user.validation_code = None;
            },
        )
    }

    async fn set_reset_token(
        &self,
        id: &UserId,
        digest: &str,
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(id, at, |_| true, |user| {
            user.reset_token = Some(digest.to_owned());
            user.reset_expires_at = Some(expires_at);
        })
    }

    async fn complete_reset(
        &self,
        id: &UserId,
        digest: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(
            id,
            at,
            |user| user.reset_token.as_deref() == Some(digest),
            |user| {
                password_hash.clone_into(&mut user.password_hash);
                user.reset_token = None;
                user.reset_expires_at = None;
            },
        )
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(id, at, |_| true, |user| {
            password_hash.clone_into(&mut user.password_hash);
        })
    }

    async fn complete_invitation(
        &self,
        id: &UserId,
        invite_code: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(
            id,
            at,
            |user| user.invite_code.as_deref() == Some(invite_code),
            |user| {
                password_hash.clone_into(&mut user.password_hash);
                user.validated = true;
                user.invite_code = None;
            },
        )
    }

    async fn set_personal(
        &self,
        id: &UserId,
        personal: &PersonalInfo,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(id, at, |_| true, |user| user.personal = Some(personal.clone()))
    }

    async fn set_company(
        &self,
        id: &UserId,
        company: &CompanyInfo,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.touch_user(id, at, |_| true, |user| user.company = Some(company.clone()))
    }

    async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.touch_user(id, at, |_| true, |user| {
            user.is_deleted = true;
            user.deleted_at = Some(at);
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let state = self.guard()?;
        Ok(state.users.iter().find(|user| user.id == *id).cloned())
    }

    async fn find_active_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .users
            .iter()
            .find(|user| user.email == *email && !user.is_deleted)
            .cloned())
    }

    async fn email_exists(
        &self,
        email: &Email,
        include_deleted: bool,
    ) -> Result<bool, StoreError> {
        let state = self.guard()?;
        Ok(state
            .users
            .iter()
            .any(|user| user.email == *email && (include_deleted || !user.is_deleted)))
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .users
            .iter()
            .find(|user| !user.is_deleted && user.reset_token.as_deref() == Some(digest))
            .cloned())
    }

    async fn find_by_invitation(
        &self,
        email: &Email,
        invite_code: &str,
    ) -> Result<Option<User>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .users
            .iter()
            .find(|user| {
                !user.is_deleted
                    && user.email == *email
                    && user.invite_code.as_deref() == Some(invite_code)
            })
            .cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        let referenced = state.clients.iter().any(|client| client.owner_id == *id)
            || state.projects.iter().any(|project| project.owner_id == *id)
            || state.notes.iter().any(|note| note.owner_id == *id);
        if referenced {
            return Err(StoreError::in_use("clients_owner_id_fkey"));
        }
        let before = state.users.len();
        state.users.retain(|user| user.id != *id);
        Ok(state.users.len() != before)
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn insert(&self, client: &Client) -> Result<(), StoreError> {
        let mut state = self.guard()?;
        if state
            .clients
            .iter()
            .any(|existing| existing.owner_id == client.owner_id && existing.name == client.name)
        {
            return Err(StoreError::duplicate("clients_owner_id_name_key"));
        }
        state.clients.push(client.clone());
        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        if state.clients.iter().any(|existing| {
            existing.id != client.id
                && existing.owner_id == client.owner_id
                && existing.name == client.name
        }) {
            return Err(StoreError::duplicate("clients_owner_id_name_key"));
        }
        match state
            .clients
            .iter_mut()
            .find(|existing| existing.id == client.id && existing.owner_id == client.owner_id)
        {
            Some(existing) => {
                *existing = client.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find(&self, owner: &UserId, id: &ClientId) -> Result<Option<Client>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .clients
            .iter()
            .find(|client| client.id == *id && client.owner_id == *owner)
            .cloned())
    }

    async fn find_by_name(
        &self,
        owner: &UserId,
        name: &str,
    ) -> Result<Option<Client>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .clients
            .iter()
            .find(|client| client.owner_id == *owner && client.name == name)
            .cloned())
    }

    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Client>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .clients
            .iter()
            .filter(|client| client.owner_id == *owner && client.is_archived == filter.is_archived())
            .cloned()
            .collect())
    }

    async fn delete(&self, owner: &UserId, id: &ClientId) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        let owned = state
            .clients
            .iter()
            .any(|client| client.id == *id && client.owner_id == *owner);
        if !owned {
            return Ok(false);
        }
        if state.projects.iter().any(|project| project.client_id == *id) {
            return Err(StoreError::in_use("projects_client_id_fkey"));
        }
        state.clients.retain(|client| client.id != *id);
        Ok(true)
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn insert(&self, project: &Project) -> Result<(), StoreError> {
        let mut state = self.guard()?;
        if state.projects.iter().any(|existing| {
            existing.owner_id == project.owner_id
                && existing.client_id == project.client_id
                && existing.title == project.title
        }) {
            return Err(StoreError::duplicate("projects_owner_client_title_key"));
        }
        state.projects.push(project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        if state.projects.iter().any(|existing| {
            existing.id != project.id
                && existing.owner_id == project.owner_id
                && existing.client_id == project.client_id
                && existing.title == project.title
        }) {
            return Err(StoreError::duplicate("projects_owner_client_title_key"));
        }
        match state
            .projects
            .iter_mut()
            .find(|existing| existing.id == project.id && existing.owner_id == project.owner_id)
        {
            Some(existing) => {
                *existing = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find(&self, owner: &UserId, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .projects
            .iter()
            .find(|project| project.id == *id && project.owner_id == *owner)
            .cloned())
    }

    async fn find_by_title(
        &self,
        owner: &UserId,
        client: &ClientId,
        title: &str,
    ) -> Result<Option<Project>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .projects
            .iter()
            .find(|project| {
                project.owner_id == *owner && project.client_id == *client && project.title == title
            })
            .cloned())
    }

    async fn list(
        &self,
        owner: &UserId,
        filter: ArchiveFilter,
    ) -> Result<Vec<Project>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .projects
            .iter()
            .filter(|project| {
                project.owner_id == *owner && project.is_archived == filter.is_archived()
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, owner: &UserId, id: &ProjectId) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        let owned = state
            .projects
            .iter()
            .any(|project| project.id == *id && project.owner_id == *owner);
        if !owned {
            return Ok(false);
        }
        if state.notes.iter().any(|note| note.project_id == *id) {
            return Err(StoreError::in_use("delivery_notes_project_id_fkey"));
        }
        state.projects.retain(|project| project.id != *id);
        Ok(true)
    }
}

#[async_trait]
impl DeliveryNoteRepository for InMemoryStore {
    async fn insert(&self, note: &DeliveryNote) -> Result<(), StoreError> {
        let mut state = self.guard()?;
        state.notes.push(note.clone());
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
    ) -> Result<Option<DeliveryNote>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .notes
            .iter()
            .find(|note| note.id == *id && note.owner_id == *owner)
            .cloned())
    }

    async fn list(&self, owner: &UserId) -> Result<Vec<DeliveryNote>, StoreError> {
        let state = self.guard()?;
        Ok(state
            .notes
            .iter()
            .filter(|note| note.owner_id == *owner)
            .cloned()
            .collect())
    }

    async fn mark_signed(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        signature_url: &str,
    ) -> Result<SignOutcome, StoreError> {
        let mut state = self.guard()?;
        let Some(note) = state
            .notes
            .iter_mut()
            .find(|note| note.id == *id && note.owner_id == *owner)
        else {
            return Ok(SignOutcome::NotFound);
        };
        if note.is_signed {
            return Ok(SignOutcome::AlreadySigned);
        }
        note.is_signed = true;
        note.signature_url = Some(signature_url.to_owned());
        Ok(SignOutcome::Signed)
    }

    async fn delete_unsigned(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut state = self.guard()?;
        let Some(position) = state
            .notes
            .iter()
            .position(|note| note.id == *id && note.owner_id == *owner)
        else {
            return Ok(DeleteOutcome::NotFound);
        };
        if state.notes[position].is_signed {
            return Ok(DeleteOutcome::Signed);
        }
        state.notes.remove(position);
        Ok(DeleteOutcome::Deleted)
    }

    async fn cache_pdf_url(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        pdf_url: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.guard()?;
        match state
            .notes
            .iter_mut()
            .find(|note| note.id == *id && note.owner_id == *owner && note.pdf_url.is_none())
        {
            Some(note) => {
                note.pdf_url = Some(pdf_url.to_owned());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
