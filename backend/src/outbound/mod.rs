//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **security**: Argon2 password hashing and JWT bearer tokens
//! - **mail**: SMTP delivery and the background notifier
//! - **pinning**: Pinata-backed content store
//! - **pdf**: printpdf document renderer
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod mail;
pub mod pdf;
pub mod persistence;
pub mod pinning;
pub mod security;
