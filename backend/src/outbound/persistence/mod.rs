//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between row structs and domain records and hold
//! no business rules. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module. Connections come from a
//! shared `bb8` pool via `diesel-async`.
//!
//! ```ignore
//! use albaran::outbound::persistence::{DbPool, DieselClientRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/albaran")).await?;
//! let clients = DieselClientRepository::new(pool.clone());
//! ```

mod diesel_client_repository;
mod diesel_delivery_note_repository;
mod diesel_error_mapping;
mod diesel_project_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_client_repository::DieselClientRepository;
pub use diesel_delivery_note_repository::DieselDeliveryNoteRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
