//! Tests for HTTP error mapping.

use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, ResponseError, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

async fn body_of(error: &Error) -> (StatusCode, Value, Option<String>) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let value = serde_json::from_slice(&bytes).expect("json envelope");
    (status, value, header)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::invalid_transition("already_signed", "signed"), StatusCode::BAD_REQUEST)]
#[case(Error::upload_failed("pin failed"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[actix_web::test]
async fn envelope_carries_kind_details_and_trace_id() {
    let error = Error::invalid_transition("note_signed", "signed notes cannot be deleted")
        .with_trace_id(TRACE_ID.to_owned());

    let (status, body, header) = body_of(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "status": "error",
            "code": 400,
            "kind": "invalid_transition",
            "message": "signed notes cannot be deleted",
            "errors": { "code": "note_signed" },
            "traceId": TRACE_ID,
        })
    );
    assert_eq!(header.as_deref(), Some(TRACE_ID));
}

#[actix_web::test]
async fn internal_errors_are_redacted() {
    let error = Error::internal("connection string postgres://secret")
        .with_details(json!({ "secret": "x" }))
        .with_trace_id(TRACE_ID.to_owned());

    let (status, body, _) = body_of(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["kind"], "internal_error");
    assert!(body.get("errors").is_none());
    assert_eq!(body["traceId"], TRACE_ID);
}

#[actix_web::test]
async fn envelope_omits_absent_optional_fields() {
    let (_, body, header) = body_of(&Error::not_found("missing")).await;

    assert!(body.get("errors").is_none());
    assert!(body.get("traceId").is_none());
    assert!(header.is_none());
}

#[derive(serde::Deserialize)]
struct Payload {
    #[expect(dead_code, reason = "only decoded to exercise the extractor")]
    name: String,
}

async fn echo_json(_payload: web::Json<Payload>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn echo_path(_id: web::Path<Uuid>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let app = actix_test::init_service(
        App::new()
            .app_data(json_config())
            .route("/", web::post().to(echo_json)),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["kind"], "invalid_request");
    assert_eq!(body["errors"]["code"], "malformed_body");
}

#[actix_web::test]
async fn malformed_identifier_reads_as_not_found() {
    let app = actix_test::init_service(
        App::new()
            .app_data(path_config())
            .route("/items/{id}", web::get().to(echo_path)),
    )
    .await;
    let request = actix_test::TestRequest::get()
        .uri("/items/not-a-uuid")
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["kind"], "not_found");
}
