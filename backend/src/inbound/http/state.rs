//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccessGate, AccountCommand, ClientCommand, ClientQuery, DeliveryNoteCommand,
    DeliveryNoteQuery, ProjectCommand, ProjectQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub gate: Arc<dyn AccessGate>,
    pub clients: Arc<dyn ClientCommand>,
    pub clients_query: Arc<dyn ClientQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub delivery_notes: Arc<dyn DeliveryNoteCommand>,
    pub delivery_notes_query: Arc<dyn DeliveryNoteQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub gate: Arc<dyn AccessGate>,
    pub clients: Arc<dyn ClientCommand>,
    pub clients_query: Arc<dyn ClientQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub delivery_notes: Arc<dyn DeliveryNoteCommand>,
    pub delivery_notes_query: Arc<dyn DeliveryNoteQuery>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            gate,
            clients,
            clients_query,
            projects,
            projects_query,
            delivery_notes,
            delivery_notes_query,
        } = ports;
        Self {
            accounts,
            gate,
            clients,
            clients_query,
            projects,
            projects_query,
            delivery_notes,
            delivery_notes_query,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
