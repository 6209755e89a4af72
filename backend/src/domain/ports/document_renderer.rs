//! Port for turning draw commands into a printable document.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::DrawCommand;

define_port_error! {
    /// Errors raised while rendering.
    pub enum RenderError {
        Layout { message: String } => "document layout failed: {message}",
        Image { message: String } => "embedded image could not be decoded: {message}",
        Encode { message: String } => "document could not be encoded: {message}",
    }
}

/// Render a document to bytes (PDF in production).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, title: &str, commands: Vec<DrawCommand>)
    -> Result<Vec<u8>, RenderError>;
}
