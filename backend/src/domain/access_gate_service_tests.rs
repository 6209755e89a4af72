//! Tests for the access gate.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::test_support::{FakeTokenService, InMemoryStore, MutableClock, sample_user};

struct Gate {
    store: Arc<InMemoryStore>,
    clock: Arc<MutableClock>,
    gate: AccessGateService,
}

fn gate(policy: ValidationPolicy) -> Gate {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(MutableClock::fixed());
    let gate = AccessGateService::new(
        store.clone(),
        Arc::new(FakeTokenService),
        clock.clone(),
        policy,
    );
    Gate { store, clock, gate }
}

fn bearer_for(gate: &Gate, user: &User) -> Option<String> {
    let token = FakeTokenService
        .issue(&user.id, gate.clock.utc())
        .expect("issue token");
    Some(format!("Bearer {}", token.token))
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("Bearer "))]
#[case(Some("Basic dXNlcjpwYXNz"))]
#[case(Some("bearer lowercase-scheme"))]
fn bearer_credential_rejects_malformed_headers(#[case] header: Option<&str>) {
    let error = bearer_credential(header).expect_err("rejected");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[test]
fn bearer_credential_extracts_token() {
    assert_eq!(bearer_credential(Some("Bearer abc.def")).expect("token"), "abc.def");
}

#[tokio::test]
async fn authenticates_validated_identity() {
    let gate = gate(ValidationPolicy::default());
    let user = sample_user("ana@example.com");
    gate.store.put_user(user.clone());

    let resolved = gate
        .gate
        .authenticate(bearer_for(&gate, &user), GateScope::Protected)
        .await
        .expect("authenticated");

    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
async fn rejects_garbage_token() {
    let gate = gate(ValidationPolicy::default());

    let error = gate
        .gate
        .authenticate(Some("Bearer not-a-token".to_owned()), GateScope::Protected)
        .await
        .expect_err("garbage");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn rejects_expired_token() {
    let gate = gate(ValidationPolicy::default());
    let user = sample_user("ana@example.com");
    gate.store.put_user(user.clone());
    let header = bearer_for(&gate, &user);

    gate.clock.advance_seconds(crate::domain::ports::TOKEN_TTL_SECS);

    let error = gate
        .gate
        .authenticate(header, GateScope::Protected)
        .await
        .expect_err("expired");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "bearer token has expired");
}

#[tokio::test]
async fn rejects_token_for_unknown_identity() {
    let gate = gate(ValidationPolicy::default());
    let ghost = sample_user("ghost@example.com");

    let error = gate
        .gate
        .authenticate(bearer_for(&gate, &ghost), GateScope::Protected)
        .await
        .expect_err("unknown");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[case(GateScope::Protected)]
#[case(GateScope::PendingValidation)]
#[tokio::test]
async fn rejects_soft_deleted_identity(#[case] scope: GateScope) {
    let gate = gate(ValidationPolicy::default());
    let mut user = sample_user("ana@example.com");
    user.is_deleted = true;
    gate.store.put_user(user.clone());

    let error = gate
        .gate
        .authenticate(bearer_for(&gate, &user), scope)
        .await
        .expect_err("deleted");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(ValidationPolicy::RequireValidated, GateScope::Protected, false)]
#[case(ValidationPolicy::RequireValidated, GateScope::PendingValidation, true)]
#[case(ValidationPolicy::AllowUnvalidated, GateScope::Protected, true)]
#[tokio::test]
async fn unvalidated_identity_follows_policy(
    #[case] policy: ValidationPolicy,
    #[case] scope: GateScope,
    #[case] admitted: bool,
) {
    let gate = gate(policy);
    let mut user = sample_user("ana@example.com");
    user.validated = false;
    gate.store.put_user(user.clone());

    let outcome = gate.gate.authenticate(bearer_for(&gate, &user), scope).await;

    match outcome {
        Ok(resolved) => {
            assert!(admitted, "unvalidated identity admitted");
            assert_eq!(resolved.id, user.id);
        }
        Err(error) => {
            assert!(!admitted, "unexpected rejection: {error}");
            assert_eq!(error.code(), ErrorCode::Forbidden);
        }
    }
}

#[tokio::test]
async fn store_outage_is_not_reported_as_unauthorised() {
    let gate = gate(ValidationPolicy::default());
    let user = sample_user("ana@example.com");
    gate.store.put_user(user.clone());
    gate.store.set_unavailable(true);

    let error = gate
        .gate
        .authenticate(bearer_for(&gate, &user), GateScope::Protected)
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
