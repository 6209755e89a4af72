//! Port abstraction for client persistence.
use async_trait::async_trait;

use super::StoreError;
use crate::domain::{ArchiveFilter, Client, ClientId, UserId};

/// Owner-scoped client storage. Every lookup filters on `owner`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Insert a client. Fails with [`StoreError::Duplicate`] when the owner
    /// already has a client with the same name.
    async fn insert(&self, client: &Client) -> Result<(), StoreError>;

    /// Overwrite mutable columns. Returns false when no owned row matched.
    async fn update(&self, client: &Client) -> Result<bool, StoreError>;

    async fn find(&self, owner: &UserId, id: &ClientId) -> Result<Option<Client>, StoreError>;

    async fn find_by_name(&self, owner: &UserId, name: &str)
    -> Result<Option<Client>, StoreError>;

    async fn list(&self, owner: &UserId, filter: ArchiveFilter) -> Result<Vec<Client>, StoreError>;

    /// Remove the row. Fails with [`StoreError::InUse`] while projects
    /// reference it; returns false when no owned row matched.
    async fn delete(&self, owner: &UserId, id: &ClientId) -> Result<bool, StoreError>;
}
