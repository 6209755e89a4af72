//! PostgreSQL-backed [`ClientRepository`]. Every statement is scoped by
//! `owner_id`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ClientRepository, StoreError};
use crate::domain::{ArchiveFilter, Client, ClientId, UserId};

use super::diesel_error_mapping::map_diesel_error;
use super::models::ClientRow;
use super::pool::DbPool;
use super::schema::clients;

#[derive(Clone)]
pub struct DieselClientRepository {
    pool: DbPool,
}

impl DieselClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for DieselClientRepository {
    async fn insert(&self, client: &Client) -> Result<(), StoreError> {
        let row = ClientRow::from(client);
        let mut conn = self.pool.get().await?;
        diesel::insert_into(clients::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert client"))?;
        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<bool, StoreError> {
        let row = ClientRow::from(client);
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            clients::table
                .filter(clients::id.eq(row.id))
                .filter(clients::owner_id.eq(row.owner_id)),
        )
        .set(&row)
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "update client"))?;
        Ok(updated > 0)
    }

    async fn find(&self, owner: &UserId, id: &ClientId) -> Result<Option<Client>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = clients::table
            .filter(clients::id.eq(id.as_uuid()))
            .filter(clients::owner_id.eq(owner.as_uuid()))
            .select(ClientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find client"))?;
        Ok(row.map(Client::from))
    }

    async fn find_by_name(
        &self,
        owner: &UserId,
        name: &str,
    ) -> Result<Option<Client>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = clients::table
            .filter(clients::owner_id.eq(owner.as_uuid()))
            .filter(clients::name.eq(name))
            .select(ClientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find client by name"))?;
        Ok(row.map(Client::from))
    }

    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Client>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = clients::table
            .filter(clients::owner_id.eq(owner.as_uuid()))
            .filter(clients::is_archived.eq(filter.is_archived()))
            .order(clients::created_at.asc())
            .select(ClientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list clients"))?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn delete(&self, owner: &UserId, id: &ClientId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(
            clients::table
                .filter(clients::id.eq(id.as_uuid()))
                .filter(clients::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "delete client"))?;
        Ok(deleted > 0)
    }
}
