//! Project domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::client_service::client_not_found;
use crate::domain::ports::{ClientRepository, ProjectCommand, ProjectQuery, ProjectRepository};
use crate::domain::{
    ArchiveFilter, Error, NewProject, Project, ProjectId, ProjectPatch, User, UserId,
};

pub(crate) fn project_not_found(id: &ProjectId) -> Error {
    Error::not_found(format!("project {id} not found"))
}

/// Project service implementing [`ProjectCommand`] and [`ProjectQuery`].
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    clients: Arc<dyn ClientRepository>,
    clock: Arc<dyn Clock>,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        clients: Arc<dyn ClientRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            clients,
            clock,
        }
    }

    async fn owned(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error> {
        self.projects
            .find(owner, id)
            .await?
            .ok_or_else(|| project_not_found(id))
    }

    async fn save(&self, project: Project) -> Result<Project, Error> {
        if !self.projects.update(&project).await? {
            return Err(project_not_found(&project.id));
        }
        Ok(project)
    }

    async fn set_archived(
        &self,
        owner: &UserId,
        id: &ProjectId,
        archived: bool,
    ) -> Result<Project, Error> {
        let mut project = self.owned(owner, id).await?;
        let now = self.clock.utc();
        project.is_archived = archived;
        project.archived_at = archived.then_some(now);
        project.updated_at = now;
        self.save(project).await
    }
}

#[async_trait]
impl ProjectCommand for ProjectService {
    async fn create(&self, owner: &User, project: NewProject) -> Result<Project, Error> {
        if self
            .clients
            .find(&owner.id, &project.client_id)
            .await?
            .is_none()
        {
            return Err(client_not_found(&project.client_id));
        }
        if self
            .projects
            .find_by_title(&owner.id, &project.client_id, &project.title)
            .await?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "project {} already exists for this client",
                project.title
            )));
        }

        let now = self.clock.utc();
        let NewProject {
            title,
            description,
            client_id,
        } = project;
        let record = Project {
            id: ProjectId::random(),
            owner_id: owner.id,
            client_id,
            title,
            description,
            company_name: owner.company_name(),
            is_archived: false,
            archived_at: None,
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(&record).await?;
        info!(project_id = %record.id, client_id = %record.client_id, "project created");
        Ok(record)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, Error> {
        let patch = patch.validate()?;
        let mut project = self.owned(owner, id).await?;
        if let Some(title) = patch.title.as_deref().filter(|title| *title != project.title) {
            if self
                .projects
                .find_by_title(owner, &project.client_id, title)
                .await?
                .is_some()
            {
                return Err(Error::conflict(format!(
                    "project {title} already exists for this client"
                )));
            }
        }
        patch.apply(&mut project);
        project.updated_at = self.clock.utc();
        self.save(project).await
    }

    async fn archive(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error> {
        self.set_archived(owner, id, true).await
    }

    async fn restore(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error> {
        self.set_archived(owner, id, false).await
    }

    async fn delete(&self, owner: &UserId, id: &ProjectId) -> Result<(), Error> {
        if !self.projects.delete(owner, id).await? {
            return Err(project_not_found(id));
        }
        info!(project_id = %id, "project deleted");
        Ok(())
    }
}

#[async_trait]
impl ProjectQuery for ProjectService {
    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Project>, Error> {
        Ok(self.projects.list(owner, filter).await?)
    }

    async fn get(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error> {
        self.owned(owner, id).await
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
