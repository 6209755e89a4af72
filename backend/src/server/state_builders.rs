//! Builders wiring outbound adapters into the services behind [`HttpState`].
//!
//! Every adapter is created once here and shared through `Arc<dyn Port>`.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::info;
use zeroize::Zeroizing;

use albaran::domain::ports::{ContentStore, Mailer, Notifier};
use albaran::domain::{
    AccessGateService, AccountService, AccountServiceDeps, ClientService, DeliveryNoteService,
    DeliveryNoteServiceDeps, FrontendLinks, ProjectService,
};
use albaran::inbound::http::state::{HttpState, HttpStatePorts};
use albaran::outbound::mail::{BackgroundNotifier, LogOnlyMailer, SmtpMailer, SmtpSettings};
use albaran::outbound::pdf::PrintPdfRenderer;
use albaran::outbound::persistence::{
    DbPool, DieselClientRepository, DieselDeliveryNoteRepository, DieselProjectRepository,
    DieselUserRepository,
};
use albaran::outbound::pinning::{PinataContentStore, PinataSettings};
use albaran::outbound::security::{Argon2Hasher, JwtTokenService};

use super::AppSettings;

fn build_notifier(settings: &AppSettings) -> io::Result<Arc<dyn Notifier>> {
    let mailer: Arc<dyn Mailer> = match &settings.smtp_host {
        Some(host) => Arc::new(
            SmtpMailer::new(&SmtpSettings {
                host: host.clone(),
                user: settings.smtp_user.clone(),
                password: settings.smtp_password.clone().map(Zeroizing::new),
                from: settings.mail_from(),
                timeout: settings.smtp_timeout(),
            })
            .map_err(|err| io::Error::other(format!("smtp mailer: {err}")))?,
        ),
        None => {
            info!("no smtp host configured; emails will only be logged");
            Arc::new(LogOnlyMailer)
        }
    };
    Ok(Arc::new(BackgroundNotifier::new(
        mailer,
        settings.smtp_timeout(),
    )))
}

fn build_content_store(settings: &AppSettings) -> io::Result<Arc<dyn ContentStore>> {
    let api_url = Url::parse(settings.pinata_api_url())
        .map_err(|err| io::Error::other(format!("pinata api url: {err}")))?;
    let store = PinataContentStore::new(PinataSettings {
        api_url,
        gateway_url: settings.pinata_gateway_url().to_owned(),
        api_key: settings.pinata_api_key.clone(),
        secret: settings.pinata_secret.clone().map(Zeroizing::new),
        timeout: settings.pinning_timeout(),
    })
    .map_err(|err| io::Error::other(format!("pinata client: {err}")))?;
    Ok(Arc::new(store))
}

/// Build handler state backed by PostgreSQL and the configured services.
///
/// # Errors
///
/// Returns [`io::Error`] when an adapter cannot be configured (bad frontend
/// URL, sender address or HTTP client).
pub fn build_http_state(settings: &AppSettings, pool: &DbPool) -> io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let clients_repo = Arc::new(DieselClientRepository::new(pool.clone()));
    let projects_repo = Arc::new(DieselProjectRepository::new(pool.clone()));
    let notes_repo = Arc::new(DieselDeliveryNoteRepository::new(pool.clone()));
    let tokens = Arc::new(JwtTokenService::new(&Zeroizing::new(
        settings.jwt_secret.clone(),
    )));
    let links = FrontendLinks::new(settings.frontend_url())
        .map_err(|err| io::Error::other(format!("frontend url: {err}")))?;

    let accounts = Arc::new(AccountService::new(AccountServiceDeps {
        users: users.clone(),
        hasher: Arc::new(Argon2Hasher),
        tokens: tokens.clone(),
        notifier: build_notifier(settings)?,
        links,
        clock: clock.clone(),
        email_reuse: settings.email_reuse_policy(),
    }));
    let gate = Arc::new(AccessGateService::new(
        users,
        tokens,
        clock.clone(),
        settings.validation_policy(),
    ));
    let clients = Arc::new(ClientService::new(clients_repo.clone(), clock.clone()));
    let projects = Arc::new(ProjectService::new(
        projects_repo.clone(),
        clients_repo.clone(),
        clock.clone(),
    ));
    let notes = Arc::new(DeliveryNoteService::new(DeliveryNoteServiceDeps {
        notes: notes_repo,
        projects: projects_repo,
        clients: clients_repo,
        content: build_content_store(settings)?,
        renderer: Arc::new(PrintPdfRenderer),
        clock,
    }));

    Ok(HttpState::new(HttpStatePorts {
        accounts,
        gate,
        clients: clients.clone(),
        clients_query: clients,
        projects: projects.clone(),
        projects_query: projects,
        delivery_notes: notes.clone(),
        delivery_notes_query: notes,
    }))
}
