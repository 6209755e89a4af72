//! Persistence error shared by every repository port.

use serde_json::json;
use tracing::error;

use super::define_port_error;
use crate::domain::Error;

define_port_error! {
    /// Failures raised by repository adapters.
    pub enum StoreError {
        /// A connection could not be checked out or was lost.
        Connection { message: String } => "store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// A unique constraint rejected the write.
        Duplicate { message: String } => "duplicate record: {message}",
        /// A foreign key still references the record.
        InUse { message: String } => "record still referenced: {message}",
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Connection { message } => {
                error!(%message, "store unavailable");
                Self::service_unavailable("storage is temporarily unavailable")
            }
            StoreError::Query { message } => {
                error!(%message, "store query failed");
                Self::internal(format!("store query failed: {message}"))
            }
            StoreError::Duplicate { .. } => Self::conflict("record already exists"),
            StoreError::InUse { .. } => Self::conflict("record is still referenced by other records")
                .with_details(json!({ "code": "resource_in_use" })),
        }
    }
}
