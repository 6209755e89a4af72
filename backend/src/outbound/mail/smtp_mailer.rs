//! `lettre` SMTP transport.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::OutboundEmail;
use crate::domain::ports::{MailError, Mailer};

/// Connection details for the relay.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub user: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub from: String,
    pub timeout: Duration,
}

/// Sends HTML messages through an authenticated STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// [`MailError::Message`] when the sender address does not parse and
    /// [`MailError::Transport`] when the relay host is unusable.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|err| MailError::message(format!("sender {}: {err}", settings.from)))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|err| MailError::transport(err.to_string()))?
            .timeout(Some(settings.timeout));
        if let (Some(user), Some(password)) = (&settings.user, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.as_str().to_owned()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn build_message(from: &Mailbox, email: &OutboundEmail) -> Result<Message, MailError> {
    let to = email
        .to
        .as_ref()
        .parse::<Mailbox>()
        .map_err(|err| MailError::message(format!("recipient: {err}")))?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .map_err(|err| MailError::message(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailError::transport(err.to_string()))?;
        debug!(code = %response.code(), to = %email.to, "email accepted by relay");
        Ok(())
    }
}
