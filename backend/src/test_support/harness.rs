//! Fully wired services over in-memory adapters.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{TimeZone, Utc};

use super::{
    FakePasswordHasher, FakeTokenService, InMemoryContentStore, InMemoryStore, MutableClock,
    RecordingNotifier, StubRenderer,
};
use crate::domain::ports::TokenService;
use crate::domain::{
    AccessGateService, AccountService, AccountServiceDeps, ClientService, DeliveryNoteService,
    DeliveryNoteServiceDeps, Email, EmailReusePolicy, FrontendLinks, ProjectService, Role, User,
    UserId, ValidationPolicy,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::middleware::Trace;

/// Frontend base URL used in emailed links.
pub const TEST_FRONTEND_URL: &str = "http://frontend.test";

/// Password every [`sample_user`] logs in with.
pub const SAMPLE_PASSWORD: &str = "secret1";

/// A validated identity with password [`SAMPLE_PASSWORD`].
pub fn sample_user(email: &str) -> User {
    let Ok(email) = Email::parse(email) else {
        panic!("sample_user requires a valid email, got {email}");
    };
    let created_at = Utc
        .with_ymd_and_hms(2024, 12, 1, 8, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("fixed timestamp"));
    User {
        id: UserId::random(),
        email,
        password_hash: FakePasswordHasher::hash_of(SAMPLE_PASSWORD),
        validated: true,
        validation_code: None,
        reset_token: None,
        reset_expires_at: None,
        invite_code: None,
        invited_by: None,
        personal: None,
        company: None,
        role: Role::User,
        is_deleted: false,
        deleted_at: None,
        created_at,
        updated_at: created_at,
    }
}

/// In-memory adapters plus the knobs integration tests turn.
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub content: Arc<InMemoryContentStore>,
    pub renderer: Arc<StubRenderer>,
    pub clock: Arc<MutableClock>,
    pub email_reuse: EmailReusePolicy,
    pub validation: ValidationPolicy,
}

impl Default for TestApp {
    fn default() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            content: Arc::new(InMemoryContentStore::new()),
            renderer: Arc::new(StubRenderer::new()),
            clock: Arc::new(MutableClock::fixed()),
            email_reuse: EmailReusePolicy::default(),
            validation: ValidationPolicy::default(),
        }
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validated identity and return it.
    pub fn seed_user(&self, email: &str) -> User {
        let user = sample_user(email);
        self.store.put_user(user.clone());
        user
    }

    /// `Authorization` header value for `user`, issued at the current clock.
    pub fn bearer_for(&self, user: &User) -> String {
        match FakeTokenService.issue(&user.id, mockable::Clock::utc(self.clock.as_ref())) {
            Ok(token) => format!("Bearer {}", token.token),
            Err(err) => panic!("fake token issue failed: {err}"),
        }
    }

    /// Handler state wired to the in-memory adapters.
    pub fn http_state(&self) -> HttpState {
        let Ok(links) = FrontendLinks::new(TEST_FRONTEND_URL) else {
            panic!("test frontend url must parse");
        };
        let accounts = Arc::new(AccountService::new(AccountServiceDeps {
            users: self.store.clone(),
            hasher: Arc::new(FakePasswordHasher),
            tokens: Arc::new(FakeTokenService),
            notifier: self.notifier.clone(),
            links,
            clock: self.clock.clone(),
            email_reuse: self.email_reuse,
        }));
        let gate = Arc::new(AccessGateService::new(
            self.store.clone(),
            Arc::new(FakeTokenService),
            self.clock.clone(),
            self.validation,
        ));
        let clients = Arc::new(ClientService::new(self.store.clone(), self.clock.clone()));
        let projects = Arc::new(ProjectService::new(
            self.store.clone(),
            self.store.clone(),
            self.clock.clone(),
        ));
        let notes = Arc::new(DeliveryNoteService::new(DeliveryNoteServiceDeps {
            notes: self.store.clone(),
            projects: self.store.clone(),
            clients: self.store.clone(),
            content: self.content.clone(),
            renderer: self.renderer.clone(),
            clock: self.clock.clone(),
        }));
        HttpState::new(HttpStatePorts {
            accounts,
            gate,
            clients: clients.clone(),
            clients_query: clients,
            projects: projects.clone(),
            projects_query: projects,
            delivery_notes: notes.clone(),
            delivery_notes_query: notes,
        })
    }
}

/// Application with the trace middleware and every API route, as served in
/// production, over `state`.
pub fn build_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Trace)
        .app_data(web::Data::new(state))
        .configure(configure_api)
}
