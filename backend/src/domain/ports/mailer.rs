//! Ports for outbound email.
//!
//! [`Mailer`] delivers one message and reports the outcome. [`Notifier`] is
//! what services call: it hands a message off and returns immediately, so a
//! slow or failing mail server never affects the response.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::OutboundEmail;

define_port_error! {
    /// Errors raised by mail transports.
    pub enum MailError {
        /// The message could not be built (bad address or header).
        Message { message: String } => "email message is invalid: {message}",
        /// The transport failed to deliver.
        Transport { message: String } => "email delivery failed: {message}",
        /// Delivery did not finish in time.
        Timeout => "email delivery timed out",
    }
}

/// Deliver a single message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Best-effort dispatch. Failures are logged by the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn dispatch(&self, email: OutboundEmail);
}
