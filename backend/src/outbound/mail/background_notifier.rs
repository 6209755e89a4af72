//! Fire-and-forget [`Notifier`] backed by a [`Mailer`].
//!
//! Each message is delivered on its own task under the dispatching
//! request's trace id. Failures and timeouts are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, info_span, warn};

use crate::domain::ports::{MailError, Mailer, Notifier};
use crate::domain::{OutboundEmail, TraceId};

#[derive(Clone)]
pub struct BackgroundNotifier {
    mailer: Arc<dyn Mailer>,
    timeout: Duration,
}

impl BackgroundNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, timeout: Duration) -> Self {
        Self { mailer, timeout }
    }
}

async fn deliver(mailer: Arc<dyn Mailer>, email: OutboundEmail, timeout: Duration) {
    let outcome = match tokio::time::timeout(timeout, mailer.send(&email)).await {
        Ok(result) => result,
        Err(_) => Err(MailError::timeout()),
    };
    if let Err(err) = outcome {
        warn!(error = %err, to = %email.to, subject = %email.subject, "email delivery failed");
    }
}

impl Notifier for BackgroundNotifier {
    fn dispatch(&self, email: OutboundEmail) {
        let mailer = Arc::clone(&self.mailer);
        let timeout = self.timeout;
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        let span = info_span!("email", trace_id = %trace_id);
        tokio::spawn(
            TraceId::scope(trace_id, deliver(mailer, email, timeout)).instrument(span),
        );
    }
}
