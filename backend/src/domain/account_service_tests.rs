//! Tests for the account service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockUserRepository, StoreError};
use crate::test_support::{
    FakePasswordHasher, FakeTokenService, InMemoryStore, MutableClock, RecordingNotifier,
    sample_user,
};

const FRONTEND: &str = "https://app.example.test";

struct Harness {
    store: Arc<InMemoryStore>,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<MutableClock>,
    service: AccountService,
}

fn build(email_reuse: EmailReusePolicy) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = Arc::new(MutableClock::fixed());
    let links = FrontendLinks::new(FRONTEND).expect("frontend url");
    let service = AccountService::new(AccountServiceDeps {
        users: store.clone(),
        hasher: Arc::new(FakePasswordHasher),
        tokens: Arc::new(FakeTokenService),
        notifier: notifier.clone(),
        links,
        clock: clock.clone(),
        email_reuse,
    });
    Harness {
        store,
        notifier,
        clock,
        service,
    }
}

#[fixture]
fn harness() -> Harness {
    build(EmailReusePolicy::default())
}

fn login(email: &str, password: &str) -> Credentials {
    Credentials::for_login(email, password).expect("login credentials")
}

fn registration(email: &str, password: &str) -> Credentials {
    Credentials::for_registration(email, password).expect("registration credentials")
}

fn password(raw: &str) -> Password {
    Password::new_secret(raw).expect("password")
}

fn reset_token_from(html: &str) -> String {
    let start = html.find("reset-password/").expect("reset link") + "reset-password/".len();
    html[start..]
        .chars()
        .take_while(char::is_ascii_hexdigit)
        .collect()
}

#[rstest]
#[tokio::test]
async fn register_stores_unvalidated_identity_and_emails_code(harness: Harness) {
    let token = harness
        .service
        .register(registration("Ana@Example.com", "secret1"))
        .await
        .expect("register");

    assert!(!token.token.is_empty());
    let stored = harness.store.user_by_email("ana@example.com").expect("stored");
    assert!(!stored.validated);
    assert_eq!(stored.password_hash, FakePasswordHasher::hash_of("secret1"));
    let code = stored.validation_code.expect("validation code");
    assert_eq!(code.len(), codes::VALIDATION_CODE_LEN);

    let email = harness
        .notifier
        .last_to("ana@example.com")
        .expect("verification email");
    assert!(email.html.contains(&code));
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_email(harness: Harness) {
    harness.store.put_user(sample_user("ana@example.com"));

    let error = harness
        .service
        .register(registration("ana@example.com", "secret1"))
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[case(EmailReusePolicy::RejectDeleted, true)]
#[case(EmailReusePolicy::AllowAfterSoftDelete, false)]
#[tokio::test]
async fn register_after_soft_delete_follows_policy(
    #[case] policy: EmailReusePolicy,
    #[case] rejected: bool,
) {
    let harness = build(policy);
    let mut deleted = sample_user("ana@example.com");
    deleted.is_deleted = true;
    harness.store.put_user(deleted);

    let outcome = harness
        .service
        .register(registration("ana@example.com", "secret1"))
        .await;

    match outcome {
        Err(error) => {
            assert!(rejected, "unexpected rejection: {error}");
            assert_eq!(error.code(), ErrorCode::Conflict);
        }
        Ok(_) => assert!(!rejected, "soft-deleted email was reused"),
    }
}

#[rstest]
#[tokio::test]
async fn login_returns_token_for_validated_identity(harness: Harness) {
    let user = sample_user("ana@example.com");
    let id = user.id;
    harness.store.put_user(user);

    let token = harness
        .service
        .login(login("ana@example.com", "secret1"))
        .await
        .expect("login");

    let verified = FakeTokenService
        .verify(&token.token, harness.clock.utc())
        .expect("token verifies");
    assert_eq!(verified, id);
}

#[rstest]
#[case("ana@example.com", "wrong-password")]
#[case("nobody@example.com", "secret1")]
#[tokio::test]
async fn login_failures_are_indistinguishable(
    harness: Harness,
    #[case] email: &str,
    #[case] secret: &str,
) {
    harness.store.put_user(sample_user("ana@example.com"));

    let error = harness
        .service
        .login(login(email, secret))
        .await
        .expect_err("invalid credentials");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.reason(), Some("invalid_credentials"));
    assert_eq!(error.message(), "invalid credentials");
}

#[rstest]
#[tokio::test]
async fn login_rejects_unvalidated_identity(harness: Harness) {
    let mut user = sample_user("ana@example.com");
    user.validated = false;
    harness.store.put_user(user);

    let error = harness
        .service
        .login(login("ana@example.com", "secret1"))
        .await
        .expect_err("unvalidated");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn login_ignores_soft_deleted_identity(harness: Harness) {
    let mut user = sample_user("ana@example.com");
    user.is_deleted = true;
    harness.store.put_user(user);

    let error = harness
        .service
        .login(login("ana@example.com", "secret1"))
        .await
        .expect_err("deleted");

    assert_eq!(error.reason(), Some("invalid_credentials"));
}

#[rstest]
#[tokio::test]
async fn validate_email_consumes_matching_code(harness: Harness) {
    let mut user = sample_user("ana@example.com");
    user.validated = false;
    user.validation_code = Some("ABC123".to_owned());
    harness.store.put_user(user.clone());

    harness
        .service
        .validate_email(&user, "ABC123")
        .await
        .expect("validated");

    let stored = harness.store.user(&user.id).expect("stored");
    assert!(stored.validated);
    assert_eq!(stored.validation_code, None);
}

#[rstest]
#[tokio::test]
async fn validate_email_rejects_wrong_code(harness: Harness) {
    let mut user = sample_user("ana@example.com");
    user.validated = false;
    user.validation_code = Some("ABC123".to_owned());
    harness.store.put_user(user.clone());

    let error = harness
        .service
        .validate_email(&user, "ZZZ999")
        .await
        .expect_err("mismatch");

    assert_eq!(error.reason(), Some("invalid_code"));
    assert!(!harness.store.user(&user.id).expect("stored").validated);
}

#[rstest]
#[tokio::test]
async fn password_reset_round_trip(harness: Harness) {
    let user = sample_user("ana@example.com");
    let id = user.id;
    harness.store.put_user(user);

    harness
        .service
        .request_password_reset("ana@example.com")
        .await
        .expect("reset requested");

    let stored = harness.store.user(&id).expect("stored");
    let email = harness.notifier.last_to("ana@example.com").expect("reset email");
    let token = reset_token_from(&email.html);
    assert_eq!(token.len(), codes::RESET_TOKEN_BYTES * 2);
    assert_eq!(stored.reset_token, Some(codes::digest_token(&token)));

    harness
        .service
        .reset_password(&token, password("brand-new"))
        .await
        .expect("reset");

    let stored = harness.store.user(&id).expect("stored");
    assert_eq!(stored.password_hash, FakePasswordHasher::hash_of("brand-new"));
    assert_eq!(stored.reset_token, None);

    let reused = harness
        .service
        .reset_password(&token, password("another-one"))
        .await
        .expect_err("token consumed");
    assert_eq!(reused.reason(), Some("invalid_or_expired_token"));
}

#[rstest]
#[tokio::test]
async fn reset_token_expires_after_an_hour(harness: Harness) {
    harness.store.put_user(sample_user("ana@example.com"));
    harness
        .service
        .request_password_reset("ana@example.com")
        .await
        .expect("reset requested");
    let email = harness.notifier.last_to("ana@example.com").expect("reset email");
    let token = reset_token_from(&email.html);

    harness.clock.advance_seconds(RESET_TOKEN_TTL_SECS);

    let error = harness
        .service
        .reset_password(&token, password("brand-new"))
        .await
        .expect_err("expired");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.reason(), Some("invalid_or_expired_token"));
}

#[rstest]
#[case("nobody@example.com")]
#[case("not-an-email")]
#[tokio::test]
async fn reset_request_for_unknown_email_is_silent(harness: Harness, #[case] email: &str) {
    harness
        .service
        .request_password_reset(email)
        .await
        .expect("silent success");

    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[tokio::test]
async fn change_password_requires_current_password(harness: Harness) {
    let user = sample_user("ana@example.com");
    harness.store.put_user(user.clone());

    let error = harness
        .service
        .change_password(&user, password("wrong1"), password("brand-new"))
        .await
        .expect_err("wrong current password");
    assert_eq!(error.reason(), Some("invalid_credentials"));

    harness
        .service
        .change_password(&user, password("secret1"), password("brand-new"))
        .await
        .expect("changed");
    let stored = harness.store.user(&user.id).expect("stored");
    assert_eq!(stored.password_hash, FakePasswordHasher::hash_of("brand-new"));
}

#[rstest]
#[tokio::test]
async fn invitation_creates_identity_in_inviter_company(harness: Harness) {
    let mut inviter = sample_user("boss@example.com");
    inviter.company = Some(CompanyInfo {
        name: Some("Acme".to_owned()),
        cif: Some("B12345678".to_owned()),
        address: None,
    });
    harness.store.put_user(inviter.clone());

    let invited = Email::parse("worker@example.com").expect("email");
    let profile = harness
        .service
        .invite(&inviter, invited.clone())
        .await
        .expect("invited");

    assert_eq!(profile.invited_by, Some(inviter.id));
    assert!(!profile.validated);
    assert_eq!(profile.company, inviter.company);

    let stored = harness
        .store
        .user_by_email("worker@example.com")
        .expect("stored");
    let code = stored.invite_code.clone().expect("invite code");
    assert_eq!(code.len(), codes::INVITE_CODE_BYTES * 2);
    let email = harness
        .notifier
        .last_to("worker@example.com")
        .expect("invitation email");
    assert!(email.html.contains(&code));

    let token = harness
        .service
        .accept_invitation(invited, &code, password("worker-pass"))
        .await
        .expect("accepted");
    assert!(!token.token.is_empty());

    let stored = harness.store.user(&stored.id).expect("stored");
    assert!(stored.validated);
    assert_eq!(stored.invite_code, None);
    assert_eq!(stored.password_hash, FakePasswordHasher::hash_of("worker-pass"));
}

#[rstest]
#[tokio::test]
async fn invitation_to_existing_email_conflicts(harness: Harness) {
    let inviter = sample_user("boss@example.com");
    harness.store.put_user(inviter.clone());
    harness.store.put_user(sample_user("worker@example.com"));

    let error = harness
        .service
        .invite(&inviter, Email::parse("worker@example.com").expect("email"))
        .await
        .expect_err("taken");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn accept_invitation_rejects_wrong_code(harness: Harness) {
    let mut invited = sample_user("worker@example.com");
    invited.validated = false;
    invited.invite_code = Some("feedface".to_owned());
    harness.store.put_user(invited);

    let error = harness
        .service
        .accept_invitation(
            Email::parse("worker@example.com").expect("email"),
            "deadbeef",
            password("worker-pass"),
        )
        .await
        .expect_err("wrong code");

    assert_eq!(error.reason(), Some("invalid_invitation"));
}

#[rstest]
#[tokio::test]
async fn update_personal_merges_fields(harness: Harness) {
    let mut user = sample_user("ana@example.com");
    user.personal = Some(PersonalInfo {
        first_name: Some("Ana".to_owned()),
        last_name: Some("Pérez".to_owned()),
        phone: None,
        nif: None,
    });
    harness.store.put_user(user.clone());

    let personal = harness
        .service
        .update_personal(
            &user,
            PersonalInfoPatch {
                phone: Some("+34600111222".to_owned()),
                ..PersonalInfoPatch::default()
            },
        )
        .await
        .expect("updated");

    assert_eq!(personal.first_name.as_deref(), Some("Ana"));
    assert_eq!(personal.phone.as_deref(), Some("+34600111222"));
    let stored = harness.store.user(&user.id).expect("stored");
    assert_eq!(stored.personal, Some(personal));
}

#[rstest]
#[tokio::test]
async fn update_personal_rejects_bad_phone_and_empty_patch(harness: Harness) {
    let user = sample_user("ana@example.com");
    harness.store.put_user(user.clone());

    let bad_phone = harness
        .service
        .update_personal(
            &user,
            PersonalInfoPatch {
                phone: Some("12".to_owned()),
                ..PersonalInfoPatch::default()
            },
        )
        .await
        .expect_err("bad phone");
    assert_eq!(bad_phone.reason(), Some("invalid_phone"));

    let empty = harness
        .service
        .update_personal(&user, PersonalInfoPatch::default())
        .await
        .expect_err("empty");
    assert_eq!(empty.reason(), Some("empty_update"));
}

#[rstest]
#[tokio::test]
async fn update_company_sets_name(harness: Harness) {
    let user = sample_user("ana@example.com");
    harness.store.put_user(user.clone());

    let company = harness
        .service
        .update_company(
            &user,
            CompanyInfoPatch {
                name: Some("Acme".to_owned()),
                ..CompanyInfoPatch::default()
            },
        )
        .await
        .expect("updated");

    assert_eq!(company.name.as_deref(), Some("Acme"));
    let stored = harness.store.user(&user.id).expect("stored");
    assert_eq!(stored.company_name().as_deref(), Some("Acme"));
}

#[rstest]
#[tokio::test]
async fn soft_delete_marks_identity(harness: Harness) {
    let user = sample_user("ana@example.com");
    harness.store.put_user(user.clone());

    harness.service.soft_delete(&user).await.expect("deleted");

    let stored = harness.store.user(&user.id).expect("row kept");
    assert!(stored.is_deleted);
    assert_eq!(stored.deleted_at, Some(harness.clock.utc()));
    assert!(harness.store.user_by_email("ana@example.com").is_none());
}

#[rstest]
#[tokio::test]
async fn hard_delete_removes_row(harness: Harness) {
    let user = sample_user("ana@example.com");
    harness.store.put_user(user.clone());

    harness.service.hard_delete(&user).await.expect("deleted");

    assert!(harness.store.user(&user.id).is_none());
}

#[rstest]
#[tokio::test]
async fn stale_snapshot_cannot_revive_a_deleted_identity(harness: Harness) {
    let snapshot = sample_user("ana@example.com");
    harness.store.put_user(snapshot.clone());
    harness.service.soft_delete(&snapshot).await.expect("deleted");

    let password_change = harness
        .service
        .change_password(&snapshot, password("secret1"), password("brand-new"))
        .await
        .expect_err("deleted identity");
    let company_change = harness
        .service
        .update_company(
            &snapshot,
            CompanyInfoPatch {
                name: Some("Acme".to_owned()),
                ..CompanyInfoPatch::default()
            },
        )
        .await
        .expect_err("deleted identity");

    assert_eq!(password_change.code(), ErrorCode::Forbidden);
    assert_eq!(company_change.code(), ErrorCode::Forbidden);
    let stored = harness.store.user(&snapshot.id).expect("row kept");
    assert!(stored.is_deleted);
    assert_eq!(stored.password_hash, snapshot.password_hash);
    assert_eq!(stored.company, None);
}

#[rstest]
#[tokio::test]
async fn validating_email_keeps_a_pending_reset_token(harness: Harness) {
    let mut snapshot = sample_user("ana@example.com");
    snapshot.validated = false;
    snapshot.validation_code = Some("ABC123".to_owned());
    harness.store.put_user(snapshot.clone());
    harness
        .service
        .request_password_reset("ana@example.com")
        .await
        .expect("reset requested");

    harness
        .service
        .validate_email(&snapshot, "ABC123")
        .await
        .expect("validated");
    harness
        .service
        .update_personal(
            &snapshot,
            PersonalInfoPatch {
                first_name: Some("Ana".to_owned()),
                ..PersonalInfoPatch::default()
            },
        )
        .await
        .expect("personal details saved");

    let stored = harness.store.user(&snapshot.id).expect("stored");
    assert!(stored.validated);
    assert!(stored.reset_token.is_some());
    assert!(stored.reset_expires_at.is_some());
    let email = harness.notifier.last_to("ana@example.com").expect("reset email");
    harness
        .service
        .reset_password(&reset_token_from(&email.html), password("brand-new"))
        .await
        .expect("token still redeemable");
}

#[rstest]
#[tokio::test]
async fn validation_code_is_single_use_across_snapshots(harness: Harness) {
    let mut snapshot = sample_user("ana@example.com");
    snapshot.validated = false;
    snapshot.validation_code = Some("ABC123".to_owned());
    harness.store.put_user(snapshot.clone());

    harness
        .service
        .validate_email(&snapshot, "ABC123")
        .await
        .expect("validated");
    let replay = harness
        .service
        .validate_email(&snapshot, "ABC123")
        .await
        .expect_err("code consumed");

    assert_eq!(replay.reason(), Some("invalid_code"));
}

#[tokio::test]
async fn store_outage_maps_to_service_unavailable() {
    let mut users = MockUserRepository::new();
    users
        .expect_email_exists()
        .times(1)
        .return_once(|_, _| Err(StoreError::connection("pool exhausted")));
    let service = AccountService::new(AccountServiceDeps {
        users: Arc::new(users),
        hasher: Arc::new(FakePasswordHasher),
        tokens: Arc::new(FakeTokenService),
        notifier: Arc::new(RecordingNotifier::new()),
        links: FrontendLinks::new(FRONTEND).expect("frontend url"),
        clock: Arc::new(MutableClock::fixed()),
        email_reuse: EmailReusePolicy::default(),
    });

    let error = service
        .register(registration("ana@example.com", "secret1"))
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

