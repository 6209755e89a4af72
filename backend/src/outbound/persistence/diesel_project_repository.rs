//! PostgreSQL-backed [`ProjectRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProjectRepository, StoreError};
use crate::domain::{ArchiveFilter, ClientId, Project, ProjectId, UserId};

use super::diesel_error_mapping::map_diesel_error;
use super::models::ProjectRow;
use super::pool::DbPool;
use super::schema::projects;

#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), StoreError> {
        let row = ProjectRow::from(project);
        let mut conn = self.pool.get().await?;
        diesel::insert_into(projects::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert project"))?;
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<bool, StoreError> {
        let row = ProjectRow::from(project);
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            projects::table
                .filter(projects::id.eq(row.id))
                .filter(projects::owner_id.eq(row.owner_id)),
        )
        .set(&row)
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "update project"))?;
        Ok(updated > 0)
    }

    async fn find(&self, owner: &UserId, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = projects::table
            .filter(projects::id.eq(id.as_uuid()))
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find project"))?;
        Ok(row.map(Project::from))
    }

    async fn find_by_title(
        &self,
        owner: &UserId,
        client: &ClientId,
        title: &str,
    ) -> Result<Option<Project>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = projects::table
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .filter(projects::client_id.eq(client.as_uuid()))
            .filter(projects::title.eq(title))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find project by title"))?;
        Ok(row.map(Project::from))
    }

    async fn list(
        &self,
        owner: &UserId,
        filter: ArchiveFilter,
    ) -> Result<Vec<Project>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = projects::table
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .filter(projects::is_archived.eq(filter.is_archived()))
            .order(projects::created_at.asc())
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list projects"))?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn delete(&self, owner: &UserId, id: &ProjectId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(
            projects::table
                .filter(projects::id.eq(id.as_uuid()))
                .filter(projects::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "delete project"))?;
        Ok(deleted > 0)
    }
}
