//! Domain primitives, services and ports.
//!
//! Purpose: hold the business rules for accounts, clients, projects and
//! delivery notes independently of HTTP, SQL or any external service.
//! Adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failures.
//! - User, Email, Credentials: identity and credential values.
//! - Client, Project, DeliveryNote: tenant-scoped resources.
//! - `*Service`: implementations of the driving ports.

pub mod codes;
pub mod document;
pub mod error;
pub mod ports;

mod access_gate_service;
mod account_service;
mod auth;
mod client;
mod client_service;
mod delivery_note;
mod delivery_note_service;
mod ids;
mod notifications;
mod policy;
mod project;
mod project_service;
mod trace_id;
mod user;
mod validation;

pub use self::access_gate_service::AccessGateService;
pub use self::account_service::{AccountService, AccountServiceDeps};
pub use self::auth::{
    BearerToken, Credentials, CredentialsValidationError, PASSWORD_MIN_LENGTH, Password,
};
pub use self::client::{ArchiveFilter, Client, ClientPatch, ClientRequest, NewClient};
pub use self::client_service::ClientService;
pub use self::delivery_note::{
    DeliveryNote, DeliveryNoteDetails, DeliveryNoteRequest, LineItem, NewDeliveryNote, NoteState,
};
pub use self::delivery_note_service::{DeliveryNoteService, DeliveryNoteServiceDeps};
pub use self::document::{DrawCommand, NoteDocument, SIGNED_FALLBACK_TEXT, SignatureBlock};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{ClientId, DeliveryNoteId, ProjectId};
pub use self::notifications::{FrontendLinks, FrontendUrlError, OutboundEmail};
pub use self::policy::{EmailReusePolicy, ValidationPolicy};
pub use self::project::{NewProject, Project, ProjectPatch, ProjectRequest};
pub use self::project_service::ProjectService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    CompanyInfo, CompanyInfoPatch, Email, PersonalInfo, PersonalInfoPatch, Role, User, UserId,
    UserProfile, UserValidationError, validate_phone,
};
pub use self::validation::FieldError;
