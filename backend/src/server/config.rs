//! Runtime settings loaded via OrthoConfig from CLI flags, `ALBARAN_*`
//! environment variables and an optional config file.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use albaran::domain::{EmailReusePolicy, ValidationPolicy};
use albaran::outbound::pinning::{DEFAULT_GATEWAY_URL, DEFAULT_PINATA_API_URL};

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_PINNING_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ALBARAN")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Secret signing bearer tokens.
    pub jwt_secret: String,
    pub bind_addr: Option<SocketAddr>,
    /// Base URL of the web frontend used in emailed links.
    pub frontend_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// SMTP relay host; email is only logged when unset.
    pub smtp_host: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_timeout_secs: Option<u64>,
    /// Sender mailbox, e.g. `Albaran <no-reply@example.com>`.
    pub mail_from: Option<String>,
    pub pinata_api_key: Option<String>,
    pub pinata_secret: Option<String>,
    pub pinata_api_url: Option<String>,
    pub pinata_gateway_url: Option<String>,
    pub pinning_timeout_secs: Option<u64>,
    /// Let soft-deleted emails register again. Off unless set.
    pub allow_email_reuse: Option<bool>,
    /// Let unvalidated identities use protected routes. Off unless set.
    pub allow_unvalidated: Option<bool>,
    /// Apply embedded migrations before serving. On unless set.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs.unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS))
    }

    pub fn mail_from(&self) -> String {
        self.mail_from.clone().unwrap_or_else(|| match &self.smtp_user {
            Some(user) if user.contains('@') => user.clone(),
            _ => "no-reply@albaran.local".to_owned(),
        })
    }

    pub fn pinata_api_url(&self) -> &str {
        self.pinata_api_url
            .as_deref()
            .unwrap_or(DEFAULT_PINATA_API_URL)
    }

    pub fn pinata_gateway_url(&self) -> &str {
        self.pinata_gateway_url
            .as_deref()
            .unwrap_or(DEFAULT_GATEWAY_URL)
    }

    pub fn pinning_timeout(&self) -> Duration {
        Duration::from_secs(
            self.pinning_timeout_secs
                .unwrap_or(DEFAULT_PINNING_TIMEOUT_SECS),
        )
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn email_reuse_policy(&self) -> EmailReusePolicy {
        if self.allow_email_reuse.unwrap_or(false) {
            EmailReusePolicy::AllowAfterSoftDelete
        } else {
            EmailReusePolicy::RejectDeleted
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        if self.allow_unvalidated.unwrap_or(false) {
            ValidationPolicy::AllowUnvalidated
        } else {
            ValidationPolicy::RequireValidated
        }
    }
}
