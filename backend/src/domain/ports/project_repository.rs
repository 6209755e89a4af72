//! Port abstraction for project persistence.
use async_trait::async_trait;

use super::StoreError;
use crate::domain::{ArchiveFilter, ClientId, Project, ProjectId, UserId};

/// Owner-scoped project storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project. Fails with [`StoreError::Duplicate`] on a repeated
    /// `(owner, client, title)`.
    async fn insert(&self, project: &Project) -> Result<(), StoreError>;

    /// Overwrite mutable columns. Returns false when no owned row matched.
    async fn update(&self, project: &Project) -> Result<bool, StoreError>;

    async fn find(&self, owner: &UserId, id: &ProjectId) -> Result<Option<Project>, StoreError>;

    async fn find_by_title(
        &self,
        owner: &UserId,
        client: &ClientId,
        title: &str,
    ) -> Result<Option<Project>, StoreError>;

    async fn list(&self, owner: &UserId, filter: ArchiveFilter)
    -> Result<Vec<Project>, StoreError>;

    /// Remove the row. Fails with [`StoreError::InUse`] while delivery notes
    /// reference it.
    async fn delete(&self, owner: &UserId, id: &ProjectId) -> Result<bool, StoreError>;
}
