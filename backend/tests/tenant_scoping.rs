//! Owner scoping across clients, projects and delivery notes.
//!
//! Two tenants share one application; every read and write made by one of
//! them must treat the other's records as absent.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use albaran::test_support::{TestApp, build_app};
use rstest::rstest;
use serde_json::{Value, json};

async fn call<S>(
    app: &S,
    method: Method,
    uri: &str,
    bearer: &str,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = actix_test::TestRequest::default()
        .method(method)
        .uri(uri)
        .insert_header((AUTHORIZATION, bearer.to_owned()));
    if let Some(body) = body {
        request = request.set_json(body);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id field").to_owned()
}

struct Tenants {
    harness: TestApp,
    alice: String,
    bob: String,
}

fn tenants() -> Tenants {
    let harness = TestApp::new();
    let alice = harness.seed_user("alice@example.com");
    let bob = harness.seed_user("bob@example.com");
    let alice = harness.bearer_for(&alice);
    let bob = harness.bearer_for(&bob);
    Tenants {
        harness,
        alice,
        bob,
    }
}

/// Alice's client, project and note ids.
async fn seed_alice<S>(app: &S, bearer: &str) -> (String, String, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, client) = call(
        app,
        Method::POST,
        "/api/clients",
        bearer,
        Some(json!({ "name": "Globex", "email": "ops@globex.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, project) = call(
        app,
        Method::POST,
        "/api/projects",
        bearer,
        Some(json!({ "title": "Roof repair", "client": client["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, note) = call(
        app,
        Method::POST,
        "/api/deliverynote",
        bearer,
        Some(json!({
            "project": project["id"],
            "items": [{ "type": "material", "description": "Tiles", "quantity": 40, "unitPrice": 1.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (id_of(&client), id_of(&project), id_of(&note))
}

#[rstest]
#[case::client_read(Method::GET, "/api/clients/{client}")]
#[case::client_archive(Method::PATCH, "/api/clients/{client}/archive")]
#[case::client_delete(Method::DELETE, "/api/clients/{client}")]
#[case::project_read(Method::GET, "/api/projects/{project}")]
#[case::project_restore(Method::PATCH, "/api/projects/{project}/restore")]
#[case::note_read(Method::GET, "/api/deliverynote/{note}")]
#[case::note_pdf(Method::GET, "/api/deliverynote/pdf/{note}")]
#[case::note_delete(Method::DELETE, "/api/deliverynote/{note}")]
#[actix_web::test]
async fn foreign_records_are_not_found(#[case] method: Method, #[case] template: &str) {
    let Tenants {
        harness,
        alice,
        bob,
    } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;
    let (client, project, note) = seed_alice(&app, &alice).await;
    let uri = template
        .replace("{client}", &client)
        .replace("{project}", &project)
        .replace("{note}", &note);

    let (status, body) = call(&app, method, &uri, &bob, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    assert_eq!(body["kind"], "not_found");
    assert_eq!(harness.renderer.render_count(), 0);
}

#[actix_web::test]
async fn listings_only_show_the_callers_records() {
    let Tenants {
        harness,
        alice,
        bob,
    } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;
    seed_alice(&app, &alice).await;

    for uri in ["/api/clients", "/api/projects", "/api/deliverynote"] {
        let (status, body) = call(&app, Method::GET, uri, &bob, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]), "{uri}");

        let (_, body) = call(&app, Method::GET, uri, &alice, None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1), "{uri}");
    }
}

#[actix_web::test]
async fn projects_cannot_hang_off_a_foreign_client() {
    let Tenants {
        harness,
        alice,
        bob,
    } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;
    let (client, _, _) = seed_alice(&app, &alice).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/projects",
        &bob,
        Some(json!({ "title": "Hijack", "client": client })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn client_names_are_unique_per_owner_only() {
    let Tenants {
        harness,
        alice,
        bob,
    } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;
    seed_alice(&app, &alice).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/clients",
        &alice,
        Some(json!({ "name": "Globex" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/clients",
        &bob,
        Some(json!({ "name": "Globex" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(harness.store.client_count(), 2);
}

#[actix_web::test]
async fn archive_moves_clients_between_listings() {
    let Tenants { harness, alice, .. } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;
    let (client, _, _) = seed_alice(&app, &alice).await;

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/api/clients/{client}/archive"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["isArchived"], true);
    assert!(body["client"]["archivedAt"].is_string());

    let (_, active) = call(&app, Method::GET, "/api/clients", &alice, None).await;
    let (_, archived) = call(&app, Method::GET, "/api/clients/archived/all", &alice, None).await;
    assert_eq!(active, json!([]));
    assert_eq!(archived[0]["id"], client.as_str());

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/api/clients/{client}/restore"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["isArchived"], false);
    assert!(body["client"]["archivedAt"].is_null());
}

#[actix_web::test]
async fn referenced_records_cannot_be_deleted() {
    let Tenants { harness, alice, .. } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;
    let (client, project, note) = seed_alice(&app, &alice).await;

    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/clients/{client}"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"]["code"], "resource_in_use");

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/projects/{project}"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/deliverynote/{note}"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/projects/{project}"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/clients/{client}"),
        &alice,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn malformed_identifiers_read_as_missing() {
    let Tenants { harness, alice, .. } = tenants();
    let app = actix_test::init_service(build_app(harness.http_state())).await;

    let (status, _) = call(&app, Method::GET, "/api/clients/not-a-uuid", &alice, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
