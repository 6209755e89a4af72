//! Deterministic stand-ins for hashing, tokens, mail, pinning and rendering.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    ContentStore, ContentStoreError, DocumentRenderer, HasherError, Notifier, PasswordHasher,
    PinRequest, RenderError, TokenError, TokenService, token_ttl,
};
use crate::domain::{BearerToken, DrawCommand, OutboundEmail, Password, UserId};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex"),
    }
}

const FAKE_HASH_PREFIX: &str = "fake$";

/// Reversible "hash" that keeps tests fast.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakePasswordHasher;

impl FakePasswordHasher {
    /// Hash that [`FakePasswordHasher::verify`] accepts for `password`.
    pub fn hash_of(password: &str) -> String {
        format!("{FAKE_HASH_PREFIX}{password}")
    }
}

#[async_trait]
impl PasswordHasher for FakePasswordHasher {
    async fn hash(&self, password: &Password) -> Result<String, HasherError> {
        Ok(Self::hash_of(password.expose()))
    }

    async fn verify(&self, password: &Password, hash: &str) -> Result<bool, HasherError> {
        let Some(stored) = hash.strip_prefix(FAKE_HASH_PREFIX) else {
            return Err(HasherError::malformed_hash("missing fake prefix"));
        };
        Ok(stored == password.expose())
    }
}

/// Unsigned tokens of the form `fake.<user id>.<expiry unix seconds>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeTokenService;

#[derive(Debug)]
struct ParsedToken {
    user: Uuid,
    expires_at: i64,
}

fn parse_fake_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.split('.');
    let (Some("fake"), Some(user), Some(expires_at), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    Some(ParsedToken {
        user: Uuid::parse_str(user).ok()?,
        expires_at: expires_at.parse().ok()?,
    })
}

impl TokenService for FakeTokenService {
    fn issue(&self, user: &UserId, issued_at: DateTime<Utc>) -> Result<BearerToken, TokenError> {
        let expires_at = (issued_at + token_ttl()).timestamp();
        Ok(BearerToken::new(format!("fake.{user}.{expires_at}")))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let parsed = parse_fake_token(token).ok_or_else(|| TokenError::invalid("unparseable"))?;
        if now.timestamp() >= parsed.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(UserId::new(parsed.user))
    }
}

/// Notifier that keeps every dispatched message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        lock(&self.sent).clone()
    }

    /// Most recent message addressed to `email`.
    pub fn last_to(&self, email: &str) -> Option<OutboundEmail> {
        lock(&self.sent)
            .iter()
            .rev()
            .find(|message| message.to.as_ref() == email)
            .cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn dispatch(&self, email: OutboundEmail) {
        lock(&self.sent).push(email);
    }
}

/// Content store keeping blobs in a map keyed by their URL.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    pins: Mutex<Vec<PinRequest>>,
    fail_pins: AtomicBool,
    fail_fetches: AtomicBool,
    counter: AtomicUsize,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads fail until switched back.
    pub fn fail_pins(&self, fail: bool) {
        self.fail_pins.store(fail, Ordering::SeqCst);
    }

    /// Make downloads fail until switched back.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Uploads attempted so far, including failed ones.
    pub fn pin_attempts(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Successful uploads, in order.
    pub fn pinned(&self) -> Vec<PinRequest> {
        lock(&self.pins).clone()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn pin(&self, request: PinRequest) -> Result<String, ContentStoreError> {
        let attempt = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_pins.load(Ordering::SeqCst) {
            return Err(ContentStoreError::rejected(503_u16, "pinning disabled"));
        }
        let url = format!("memory://{}/{attempt}", request.name);
        lock(&self.blobs).insert(url.clone(), request.bytes.clone());
        lock(&self.pins).push(request);
        Ok(url)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ContentStoreError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(ContentStoreError::transport("fetch disabled"));
        }
        lock(&self.blobs)
            .get(url)
            .cloned()
            .ok_or_else(|| ContentStoreError::rejected(404_u16, format!("{url} not pinned")))
    }
}

/// Renderer producing a plain-text transcript of the draw commands.
#[derive(Debug, Default)]
pub struct StubRenderer {
    renders: Mutex<Vec<Vec<DrawCommand>>>,
    reject_images: AtomicBool,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`RenderError::Image`] whenever an image is present.
    pub fn reject_images(&self, reject: bool) {
        self.reject_images.store(reject, Ordering::SeqCst);
    }

    pub fn render_count(&self) -> usize {
        lock(&self.renders).len()
    }

    pub fn last_commands(&self) -> Option<Vec<DrawCommand>> {
        lock(&self.renders).last().cloned()
    }

    /// Transcript [`DocumentRenderer::render`] returns for these commands.
    pub fn transcript(title: &str, commands: &[DrawCommand]) -> Vec<u8> {
        let mut out = format!("%PDF-stub {title}\n");
        for command in commands {
            let line = match command {
                DrawCommand::Title(text) | DrawCommand::Heading(text) | DrawCommand::Text(text) => {
                    text.clone()
                }
                DrawCommand::Spacer => String::new(),
                DrawCommand::Image(bytes) => format!("[image {} bytes]", bytes.len()),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out.into_bytes()
    }
}

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render(
        &self,
        title: &str,
        commands: Vec<DrawCommand>,
    ) -> Result<Vec<u8>, RenderError> {
        let has_image = commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Image(_)));
        if has_image && self.reject_images.load(Ordering::SeqCst) {
            return Err(RenderError::image("stub rejects images"));
        }
        let bytes = Self::transcript(title, &commands);
        lock(&self.renders).push(commands);
        Ok(bytes)
    }
}
