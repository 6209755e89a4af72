//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`AccessGate`]) are implemented by
//! domain services and called by inbound adapters. Driven ports
//! (repositories, [`PasswordHasher`], [`TokenService`], [`Mailer`],
//! [`ContentStore`], [`DocumentRenderer`]) are implemented by outbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_gate;
mod account_command;
mod client_command;
mod client_repository;
mod content_store;
mod delivery_note_command;
mod delivery_note_repository;
mod document_renderer;
mod mailer;
mod password_hasher;
mod project_command;
mod project_repository;
mod store_error;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use access_gate::MockAccessGate;
pub use access_gate::{AccessGate, GateScope};
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
pub use client_command::{ClientCommand, ClientQuery};
#[cfg(test)]
pub use client_command::{MockClientCommand, MockClientQuery};
#[cfg(test)]
pub use client_repository::MockClientRepository;
pub use client_repository::ClientRepository;
#[cfg(test)]
pub use content_store::MockContentStore;
pub use content_store::{ContentStore, ContentStoreError, PinRequest};
pub use delivery_note_command::{
    DeliveryNoteCommand, DeliveryNoteQuery, PdfOutcome, SignatureUpload,
};
#[cfg(test)]
pub use delivery_note_command::{MockDeliveryNoteCommand, MockDeliveryNoteQuery};
#[cfg(test)]
pub use delivery_note_repository::MockDeliveryNoteRepository;
pub use delivery_note_repository::{DeleteOutcome, DeliveryNoteRepository, SignOutcome};
#[cfg(test)]
pub use document_renderer::MockDocumentRenderer;
pub use document_renderer::{DocumentRenderer, RenderError};
pub use mailer::{MailError, Mailer, Notifier};
#[cfg(test)]
pub use mailer::{MockMailer, MockNotifier};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{HasherError, PasswordHasher};
pub use project_command::{ProjectCommand, ProjectQuery};
#[cfg(test)]
pub use project_command::{MockProjectCommand, MockProjectQuery};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::ProjectRepository;
pub use store_error::StoreError;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TOKEN_TTL_SECS, TokenError, TokenService, token_ttl};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
