//! Port abstraction for delivery-note persistence.
//!
//! Lifecycle writes are conditional so that a sign racing a delete on the
//! same note resolves in storage: whichever statement commits first wins and
//! the loser observes the new state.
use async_trait::async_trait;

use super::StoreError;
use crate::domain::{DeliveryNote, DeliveryNoteId, UserId};

/// Result of a conditional sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutcome {
    /// `is_signed` flipped and the signature URL was stored.
    Signed,
    /// The note was already signed; nothing changed.
    AlreadySigned,
    /// No owned note with this id exists.
    NotFound,
}

/// Result of a conditional delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The note is signed and was kept.
    Signed,
    NotFound,
}

/// Owner-scoped delivery-note storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryNoteRepository: Send + Sync {
    async fn insert(&self, note: &DeliveryNote) -> Result<(), StoreError>;

    async fn find(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
    ) -> Result<Option<DeliveryNote>, StoreError>;

    async fn list(&self, owner: &UserId) -> Result<Vec<DeliveryNote>, StoreError>;

    /// Set `signature_url` and `is_signed` together, only while unsigned.
    async fn mark_signed(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        signature_url: &str,
    ) -> Result<SignOutcome, StoreError>;

    /// Remove the note only while unsigned.
    async fn delete_unsigned(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
    ) -> Result<DeleteOutcome, StoreError>;

    /// Store `pdf_url` if none is cached yet. Returns false when a URL was
    /// already present or the note is gone.
    async fn cache_pdf_url(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        pdf_url: &str,
    ) -> Result<bool, StoreError>;
}
