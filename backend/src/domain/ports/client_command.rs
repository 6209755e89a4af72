//! Driving ports for client use-cases.

use async_trait::async_trait;

use crate::domain::{ArchiveFilter, Client, ClientId, ClientPatch, Error, NewClient, User, UserId};

/// Client mutations, all scoped to the calling owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientCommand: Send + Sync {
    /// Create a client stamped with the owner and their company name.
    async fn create(&self, owner: &User, client: NewClient) -> Result<Client, Error>;

    async fn update(
        &self,
        owner: &UserId,
        id: &ClientId,
        patch: ClientPatch,
    ) -> Result<Client, Error>;

    async fn archive(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error>;

    async fn restore(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error>;

    async fn delete(&self, owner: &UserId, id: &ClientId) -> Result<(), Error>;
}

/// Client reads, scoped to the calling owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientQuery: Send + Sync {
    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Client>, Error>;

    async fn get(&self, owner: &UserId, id: &ClientId) -> Result<Client, Error>;
}
