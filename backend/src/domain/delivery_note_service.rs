//! Delivery-note lifecycle service.
//!
//! Signing and deletion rely on conditional writes in the repository, so two
//! requests racing on the same note settle on whichever commits first. PDF
//! rendering degrades instead of failing: a missing signature image becomes a
//! text line and a failed upload still returns the rendered bytes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::project_service::project_not_found;
use crate::domain::ports::{
    ClientRepository, ContentStore, DeleteOutcome, DeliveryNoteCommand, DeliveryNoteQuery,
    DeliveryNoteRepository, DocumentRenderer, PdfOutcome, PinRequest, ProjectRepository,
    RenderError, SignOutcome, SignatureUpload,
};
use crate::domain::{
    Client, DeliveryNote, DeliveryNoteDetails, DeliveryNoteId, Error, NewDeliveryNote,
    NoteDocument, Project, SignatureBlock, User, UserId,
};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const FALLBACK_IMAGE_TYPE: &str = "application/octet-stream";

fn note_not_found(id: &DeliveryNoteId) -> Error {
    Error::not_found(format!("delivery note {id} not found"))
}

fn already_signed() -> Error {
    Error::invalid_transition("already_signed", "delivery note is already signed")
}

fn map_render_error(error: &RenderError) -> Error {
    Error::internal(format!("delivery note rendering failed: {error}"))
}

/// Collaborators required by [`DeliveryNoteService`].
#[derive(Clone)]
pub struct DeliveryNoteServiceDeps {
    pub notes: Arc<dyn DeliveryNoteRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub content: Arc<dyn ContentStore>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub clock: Arc<dyn Clock>,
}

/// Delivery-note service implementing [`DeliveryNoteCommand`] and
/// [`DeliveryNoteQuery`].
#[derive(Clone)]
pub struct DeliveryNoteService {
    deps: DeliveryNoteServiceDeps,
}

impl DeliveryNoteService {
    pub fn new(deps: DeliveryNoteServiceDeps) -> Self {
        Self { deps }
    }

    async fn owned(&self, owner: &UserId, id: &DeliveryNoteId) -> Result<DeliveryNote, Error> {
        self.deps
            .notes
            .find(owner, id)
            .await?
            .ok_or_else(|| note_not_found(id))
    }

    /// Project and client a note belongs to.
    async fn lineage(
        &self,
        owner: &UserId,
        note: &DeliveryNote,
    ) -> Result<(Project, Client), Error> {
        let project = self
            .deps
            .projects
            .find(owner, &note.project_id)
            .await?
            .ok_or_else(|| project_not_found(&note.project_id))?;
        let client = self
            .deps
            .clients
            .find(owner, &project.client_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("client {} not found", project.client_id)))?;
        Ok((project, client))
    }

    async fn signature_block(&self, note: &DeliveryNote) -> SignatureBlock {
        if !note.is_signed {
            return SignatureBlock::Unsigned;
        }
        let Some(url) = note.signature_url.as_deref() else {
            return SignatureBlock::Unavailable;
        };
        match self.deps.content.fetch(url).await {
            Ok(bytes) => SignatureBlock::Image(bytes),
            Err(err) => {
                warn!(note_id = %note.id, error = %err, "signature image unavailable");
                SignatureBlock::Unavailable
            }
        }
    }

    async fn render(&self, mut document: NoteDocument) -> Result<Vec<u8>, Error> {
        let title = document.title();
        match self.deps.renderer.render(&title, document.compose()).await {
            Ok(bytes) => Ok(bytes),
            Err(RenderError::Image { message }) => {
                warn!(%message, "signature image could not be embedded");
                document.signature = SignatureBlock::Unavailable;
                self.deps
                    .renderer
                    .render(&title, document.compose())
                    .await
                    .map_err(|err| map_render_error(&err))
            }
            Err(err) => Err(map_render_error(&err)),
        }
    }

    async fn pin_and_cache(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        bytes: Vec<u8>,
    ) -> Option<String> {
        let request = PinRequest {
            name: format!("albaran-{id}"),
            file_name: format!("albaran-{id}.pdf"),
            content_type: PDF_CONTENT_TYPE.to_owned(),
            bytes,
        };
        let url = match self.deps.content.pin(request).await {
            Ok(url) => url,
            Err(err) => {
                warn!(note_id = %id, error = %err, "pdf upload failed; serving uncached bytes");
                return None;
            }
        };
        match self.deps.notes.cache_pdf_url(owner, id, &url).await {
            Ok(true) => {
                info!(note_id = %id, "pdf cached");
                Some(url)
            }
            Ok(false) => {
                debug!(note_id = %id, "pdf url already cached by a concurrent request");
                Some(url)
            }
            Err(err) => {
                error!(note_id = %id, error = %err, "pdf url could not be stored");
                None
            }
        }
    }
}

#[async_trait]
impl DeliveryNoteCommand for DeliveryNoteService {
    async fn create(&self, owner: &UserId, note: NewDeliveryNote) -> Result<DeliveryNote, Error> {
        if self
            .deps
            .projects
            .find(owner, &note.project_id)
            .await?
            .is_none()
        {
            return Err(project_not_found(&note.project_id));
        }
        let record = DeliveryNote {
            id: DeliveryNoteId::random(),
            project_id: note.project_id,
            owner_id: *owner,
            items: note.items,
            is_signed: false,
            signature_url: None,
            pdf_url: None,
            created_at: self.deps.clock.utc(),
        };
        self.deps.notes.insert(&record).await?;
        info!(note_id = %record.id, project_id = %record.project_id, "delivery note created");
        Ok(record)
    }

    async fn sign(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        signature: Option<SignatureUpload>,
    ) -> Result<String, Error> {
        let note = self.owned(owner, id).await?;
        if note.is_signed {
            return Err(already_signed());
        }
        let Some(signature) = signature.filter(|upload| !upload.bytes.is_empty()) else {
            return Err(Error::invalid_request("signature image is required")
                .with_details(json!({ "field": "signature", "code": "missing_field" })));
        };

        let SignatureUpload {
            bytes,
            file_name,
            content_type,
        } = signature;
        let request = PinRequest {
            name: format!("sig-{id}"),
            file_name: file_name.unwrap_or_else(|| format!("sig-{id}")),
            content_type: content_type.unwrap_or_else(|| FALLBACK_IMAGE_TYPE.to_owned()),
            bytes,
        };
        let url = self.deps.content.pin(request).await.map_err(|err| {
            error!(note_id = %id, error = %err, "signature upload failed");
            Error::upload_failed("signature upload failed")
        })?;

        match self.deps.notes.mark_signed(owner, id, &url).await? {
            SignOutcome::Signed => {
                info!(note_id = %id, "delivery note signed");
                Ok(url)
            }
            SignOutcome::AlreadySigned => Err(already_signed()),
            SignOutcome::NotFound => Err(note_not_found(id)),
        }
    }

    async fn delete(&self, owner: &UserId, id: &DeliveryNoteId) -> Result<(), Error> {
        match self.deps.notes.delete_unsigned(owner, id).await? {
            DeleteOutcome::Deleted => {
                info!(note_id = %id, "delivery note deleted");
                Ok(())
            }
            DeleteOutcome::Signed => Err(Error::invalid_transition(
                "note_signed",
                "signed delivery notes cannot be deleted",
            )),
            DeleteOutcome::NotFound => Err(note_not_found(id)),
        }
    }

    async fn render_pdf(&self, owner: &User, id: &DeliveryNoteId) -> Result<PdfOutcome, Error> {
        let note = self.owned(&owner.id, id).await?;
        if let Some(url) = &note.pdf_url {
            return Ok(PdfOutcome::Cached(url.clone()));
        }

        let (project, client) = self.lineage(&owner.id, &note).await?;
        let signature = self.signature_block(&note).await;
        let document = NoteDocument {
            note_id: note.id,
            owner_email: owner.email.to_string(),
            client_name: client.name,
            project_title: project.title,
            items: note.items,
            signature,
        };
        let bytes = self.render(document).await?;
        let url = self.pin_and_cache(&owner.id, id, bytes.clone()).await;
        Ok(PdfOutcome::Rendered { bytes, url })
    }
}

#[async_trait]
impl DeliveryNoteQuery for DeliveryNoteService {
    async fn list(&self, owner: &UserId) -> Result<Vec<DeliveryNote>, Error> {
        Ok(self.deps.notes.list(owner).await?)
    }

    async fn get(&self, owner: &User, id: &DeliveryNoteId) -> Result<DeliveryNoteDetails, Error> {
        let note = self.owned(&owner.id, id).await?;
        let (project, client) = self.lineage(&owner.id, &note).await?;
        Ok(DeliveryNoteDetails {
            state: note.state(),
            note,
            project_title: project.title,
            client_name: client.name,
            owner_email: owner.email.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "delivery_note_service_tests.rs"]
mod tests;
