//! Port for content-addressed storage (a pinning service in production).
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by content store adapters.
    pub enum ContentStoreError {
        /// Network failure or timeout.
        Transport { message: String } => "content store request failed: {message}",
        /// The service answered with a non-success status.
        Rejected { status: u16, message: String } => "content store rejected request ({status}): {message}",
        /// The response body could not be understood.
        Decode { message: String } => "content store response was malformed: {message}",
        /// The adapter is not configured for uploads.
        NotConfigured => "content store credentials are not configured",
    }
}

/// Bytes to pin plus the metadata the service records with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequest {
    /// Human-readable name stored as pin metadata.
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Store and retrieve immutable content by URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload bytes and return a stable URL for them.
    async fn pin(&self, request: PinRequest) -> Result<String, ContentStoreError>;

    /// Download the bytes behind a URL returned by [`ContentStore::pin`].
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ContentStoreError>;
}
