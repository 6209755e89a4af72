//! Mailer used when no SMTP host is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::OutboundEmail;
use crate::domain::ports::{MailError, Mailer};

/// Records each message in the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyMailer;

#[async_trait]
impl Mailer for LogOnlyMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "smtp disabled; email not sent");
        Ok(())
    }
}
