//! Driving ports for project use-cases.

use async_trait::async_trait;

use crate::domain::{
    ArchiveFilter, Error, NewProject, Project, ProjectId, ProjectPatch, User, UserId,
};

/// Project mutations, all scoped to the calling owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectCommand: Send + Sync {
    /// Create a project under one of the owner's clients.
    async fn create(&self, owner: &User, project: NewProject) -> Result<Project, Error>;

    async fn update(
        &self,
        owner: &UserId,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, Error>;

    async fn archive(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error>;

    async fn restore(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error>;

    async fn delete(&self, owner: &UserId, id: &ProjectId) -> Result<(), Error>;
}

/// Project reads, scoped to the calling owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectQuery: Send + Sync {
    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Project>, Error>;

    async fn get(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error>;
}
