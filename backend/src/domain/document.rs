//! Layout of the printable delivery-note document.
//!
//! Composition is pure: it turns note data into a list of [`DrawCommand`]s
//! that a [`DocumentRenderer`](super::ports::DocumentRenderer) lays out on
//! pages. Fetching the signature image happens before composition.

use super::{DeliveryNoteId, LineItem};

/// One layout instruction, drawn top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Large centred heading.
    Title(String),
    /// Underlined section heading.
    Heading(String),
    /// Body text line.
    Text(String),
    /// Vertical gap of roughly one line.
    Spacer,
    /// Embedded raster image (PNG or JPEG bytes).
    Image(Vec<u8>),
}

/// Signature content available when composing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureBlock {
    /// The note is not signed.
    Unsigned,
    /// Image bytes downloaded from the signature URL.
    Image(Vec<u8>),
    /// The note is signed but its image could not be retrieved.
    Unavailable,
}

/// Data printed on a delivery note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDocument {
    pub note_id: DeliveryNoteId,
    pub owner_email: String,
    pub client_name: String,
    pub project_title: String,
    pub items: Vec<LineItem>,
    pub signature: SignatureBlock,
}

/// Text printed when a signed note's image cannot be fetched.
pub const SIGNED_FALLBACK_TEXT: &str = "Signed electronically";

impl NoteDocument {
    /// Document title, also used as PDF metadata.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Delivery note {}", self.note_id)
    }

    /// Lay out the document.
    #[must_use]
    pub fn compose(&self) -> Vec<DrawCommand> {
        let mut commands = vec![
            DrawCommand::Title(self.title()),
            DrawCommand::Spacer,
            DrawCommand::Text(format!("User: {}", self.owner_email)),
            DrawCommand::Text(format!("Client: {}", self.client_name)),
            DrawCommand::Text(format!("Project: {}", self.project_title)),
            DrawCommand::Spacer,
        ];
        commands.extend(
            self.items
                .iter()
                .map(|item| DrawCommand::Text(item.describe())),
        );
        match &self.signature {
            SignatureBlock::Unsigned => {}
            SignatureBlock::Image(bytes) => {
                commands.push(DrawCommand::Spacer);
                commands.push(DrawCommand::Heading("Signed:".to_owned()));
                commands.push(DrawCommand::Image(bytes.clone()));
            }
            SignatureBlock::Unavailable => {
                commands.push(DrawCommand::Spacer);
                commands.push(DrawCommand::Heading("Signed:".to_owned()));
                commands.push(DrawCommand::Text(SIGNED_FALLBACK_TEXT.to_owned()));
            }
        }
        commands
    }
}
