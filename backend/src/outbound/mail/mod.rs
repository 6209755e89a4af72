//! Outbound email: SMTP delivery, a log-only fallback and the background
//! dispatcher services talk to.

mod background_notifier;
mod log_only_mailer;
mod smtp_mailer;

pub use background_notifier::BackgroundNotifier;
pub use log_only_mailer::LogOnlyMailer;
pub use smtp_mailer::{SmtpMailer, SmtpSettings};
