//! Client domain service.
//!
//! Every operation is scoped to the calling owner. A client that exists but
//! belongs to someone else is reported exactly like a missing one.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ClientCommand, ClientQuery, ClientRepository};
use crate::domain::{
    ArchiveFilter, Client, ClientId, ClientPatch, Error, NewClient, User, UserId,
};

pub(crate) fn client_not_found(id: &ClientId) -> Error {
    Error::not_found(format!("client {id} not found"))
}

/// Client service implementing [`ClientCommand`] and [`ClientQuery`].
#[derive(Clone)]
pub struct ClientService {
    clients: Arc<dyn ClientRepository>,
    clock: Arc<dyn Clock>,
}

impl ClientService {
    pub fn new(clients: Arc<dyn ClientRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { clients, clock }
    }

    async fn owned(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error> {
        self.clients
            .find(owner, id)
            .await?
            .ok_or_else(|| client_not_found(id))
    }

    async fn save(&self, client: Client) -> Result<Client, Error> {
        if !self.clients.update(&client).await? {
            return Err(client_not_found(&client.id));
        }
        Ok(client)
    }

    async fn set_archived(
        &self,
        owner: &UserId,
        id: &ClientId,
        archived: bool,
    ) -> Result<Client, Error> {
        let mut client = self.owned(owner, id).await?;
        let now = self.clock.utc();
        client.is_archived = archived;
        client.archived_at = archived.then_some(now);
        client.updated_at = now;
        self.save(client).await
    }
}

#[async_trait]
impl ClientCommand for ClientService {
    async fn create(&self, owner: &User, client: NewClient) -> Result<Client, Error> {
        if self
            .clients
            .find_by_name(&owner.id, &client.name)
            .await?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "client {} already exists",
                client.name
            )));
        }

        let now = self.clock.utc();
        let NewClient {
            name,
            email,
            phone,
            address,
        } = client;
        let record = Client {
            id: ClientId::random(),
            owner_id: owner.id,
            name,
            email,
            phone,
            address,
            company_name: owner.company_name(),
            is_archived: false,
            archived_at: None,
            created_at: now,
            updated_at: now,
        };
        self.clients.insert(&record).await?;
        info!(client_id = %record.id, owner_id = %owner.id, "client created");
        Ok(record)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ClientId,
        patch: ClientPatch,
    ) -> Result<Client, Error> {
        let patch = patch.validate()?;
        let mut client = self.owned(owner, id).await?;
        if let Some(name) = patch.name.as_deref().filter(|name| *name != client.name) {
            if self.clients.find_by_name(owner, name).await?.is_some() {
                return Err(Error::conflict(format!("client {name} already exists")));
            }
        }
        patch.apply(&mut client);
        client.updated_at = self.clock.utc();
        self.save(client).await
    }

    async fn archive(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error> {
        self.set_archived(owner, id, true).await
    }

    async fn restore(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error> {
        self.set_archived(owner, id, false).await
    }

    async fn delete(&self, owner: &UserId, id: &ClientId) -> Result<(), Error> {
        if !self.clients.delete(owner, id).await? {
            return Err(client_not_found(id));
        }
        info!(client_id = %id, "client deleted");
        Ok(())
    }
}

#[async_trait]
impl ClientQuery for ClientService {
    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Client>, Error> {
        Ok(self.clients.list(owner, filter).await?)
    }

    async fn get(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error> {
        self.owned(owner, id).await
    }
}

#[cfg(test)]
#[path = "client_service_tests.rs"]
mod tests;
