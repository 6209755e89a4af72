//! Driving ports for the delivery-note lifecycle.

use async_trait::async_trait;

use crate::domain::{
    DeliveryNote, DeliveryNoteDetails, DeliveryNoteId, Error, NewDeliveryNote, User, UserId,
};

/// Uploaded signature image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Result of a PDF request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfOutcome {
    /// A document was pinned earlier; fetch it from this URL.
    Cached(String),
    /// Freshly rendered bytes. `url` is set when pinning succeeded.
    Rendered { bytes: Vec<u8>, url: Option<String> },
}

/// Delivery-note mutations, scoped to the calling owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryNoteCommand: Send + Sync {
    /// Create a note under one of the owner's projects.
    async fn create(&self, owner: &UserId, note: NewDeliveryNote) -> Result<DeliveryNote, Error>;

    /// Pin the signature image and mark the note signed. Returns the
    /// signature URL.
    async fn sign(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        signature: Option<SignatureUpload>,
    ) -> Result<String, Error>;

    /// Delete an unsigned note.
    async fn delete(&self, owner: &UserId, id: &DeliveryNoteId) -> Result<(), Error>;

    /// Return the cached PDF URL or render, pin and cache a new document.
    async fn render_pdf(&self, owner: &User, id: &DeliveryNoteId) -> Result<PdfOutcome, Error>;
}

/// Delivery-note reads, scoped to the calling owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryNoteQuery: Send + Sync {
    async fn list(&self, owner: &UserId) -> Result<Vec<DeliveryNote>, Error>;

    /// Fetch a note expanded with project, client and owner names.
    async fn get(&self, owner: &User, id: &DeliveryNoteId) -> Result<DeliveryNoteDetails, Error>;
}
