//! Delivery-note API handlers.
//!
//! ```text
//! POST   /api/deliverynote             {"project","items":[...]}
//! GET    /api/deliverynote
//! GET    /api/deliverynote/{id}        note with project, client and owner names
//! GET    /api/deliverynote/pdf/{id}    302 to the pinned PDF, or the PDF bytes
//! POST   /api/deliverynote/sign/{id}   multipart field `signature`
//! DELETE /api/deliverynote/{id}        unsigned notes only
//! ```

use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes as FormBytes;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{PdfOutcome, SignatureUpload};
use crate::domain::{
    DeliveryNote, DeliveryNoteDetails, DeliveryNoteId, DeliveryNoteRequest, NewDeliveryNote,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::SuccessResponse;

/// Multipart body of `POST /api/deliverynote/sign/{id}`.
#[derive(Debug, MultipartForm)]
pub struct SignatureForm {
    pub signature: Option<FormBytes>,
}

impl SignatureForm {
    fn into_upload(self) -> Option<SignatureUpload> {
        self.signature.map(|part| SignatureUpload {
            bytes: part.data.to_vec(),
            file_name: part.file_name,
            content_type: part.content_type.map(|mime| mime.to_string()),
        })
    }
}

/// OpenAPI description of [`SignatureForm`].
#[derive(ToSchema)]
pub struct SignatureFormSchema {
    /// Signature image.
    #[schema(value_type = String, format = Binary)]
    pub signature: Vec<u8>,
}

/// Result of a successful signature.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub signature_url: String,
}

/// Create a draft note under one of the caller's projects.
#[utoipa::path(
    post,
    path = "/api/deliverynote",
    request_body = DeliveryNoteRequest,
    responses(
        (status = 201, description = "Created", body = DeliveryNote),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 404, description = "Project not found", body = ErrorEnvelope),
    ),
    tags = ["delivery notes"],
    operation_id = "createDeliveryNote"
)]
#[post("")]
pub async fn create_note(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<DeliveryNoteRequest>,
) -> ApiResult<HttpResponse> {
    let note = NewDeliveryNote::try_from(payload.into_inner())?;
    let created = state.delivery_notes.create(&user.id, note).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/deliverynote",
    responses(
        (status = 200, description = "Notes", body = [DeliveryNote]),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["delivery notes"],
    operation_id = "listDeliveryNotes"
)]
#[get("")]
pub async fn list_notes(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<Vec<DeliveryNote>>> {
    let notes = state.delivery_notes_query.list(&user.id).await?;
    Ok(web::Json(notes))
}

#[utoipa::path(
    get,
    path = "/api/deliverynote/{id}",
    params(("id" = Uuid, Path, description = "Delivery note identifier")),
    responses(
        (status = 200, description = "Note with related names", body = DeliveryNoteDetails),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["delivery notes"],
    operation_id = "getDeliveryNote"
)]
#[get("/{id}")]
pub async fn get_note(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<DeliveryNoteDetails>> {
    let id = DeliveryNoteId::new(path.into_inner());
    let details = state.delivery_notes_query.get(&user, &id).await?;
    Ok(web::Json(details))
}

/// Redirect to the pinned document or stream a freshly rendered one.
#[utoipa::path(
    get,
    path = "/api/deliverynote/pdf/{id}",
    params(("id" = Uuid, Path, description = "Delivery note identifier")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 302, description = "Redirect to the pinned PDF"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["delivery notes"],
    operation_id = "getDeliveryNotePdf"
)]
#[get("/pdf/{id}")]
pub async fn note_pdf(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = DeliveryNoteId::new(path.into_inner());
    match state.delivery_notes.render_pdf(&user, &id).await? {
        PdfOutcome::Cached(url) => Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, url))
            .finish()),
        PdfOutcome::Rendered { bytes, .. } => Ok(HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Inline,
                parameters: vec![DispositionParam::Filename(format!("albaran-{id}.pdf"))],
            })
            .body(bytes)),
    }
}

/// Attach a signature image. A note can be signed once.
#[utoipa::path(
    post,
    path = "/api/deliverynote/sign/{id}",
    params(("id" = Uuid, Path, description = "Delivery note identifier")),
    request_body(content = SignatureFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Signed", body = SignResponse),
        (status = 400, description = "Missing image or already signed", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 500, description = "Signature upload failed", body = ErrorEnvelope),
    ),
    tags = ["delivery notes"],
    operation_id = "signDeliveryNote"
)]
#[post("/sign/{id}")]
pub async fn sign_note(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
    form: Result<MultipartForm<SignatureForm>, actix_web::Error>,
) -> actix_web::Result<web::Json<SignResponse>> {
    let id = DeliveryNoteId::new(path.into_inner());
    let form = match form {
        Ok(form) => form,
        Err(err) => {
            // Unknown or foreign notes answer 404 before any body error.
            state.delivery_notes_query.get(&user, &id).await?;
            return Err(err);
        }
    };
    let upload = form.into_inner().into_upload();
    let signature_url = state.delivery_notes.sign(&user.id, &id, upload).await?;
    Ok(web::Json(SignResponse {
        success: true,
        signature_url,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/deliverynote/{id}",
    params(("id" = Uuid, Path, description = "Delivery note identifier")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 400, description = "Note is signed", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["delivery notes"],
    operation_id = "deleteDeliveryNote"
)]
#[delete("/{id}")]
pub async fn delete_note(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let id = DeliveryNoteId::new(path.into_inner());
    state.delivery_notes.delete(&user.id, &id).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Mount the delivery-note routes on a `/deliverynote` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_note)
        .service(list_notes)
        .service(note_pdf)
        .service(sign_note)
        .service(get_note)
        .service(delete_note);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::domain::{DeliveryNoteId, User};
    use crate::test_support::{TestApp, build_app};

    const BOUNDARY: &str = "albaran-boundary";

    fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"firma.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_json<S>(app: &S, bearer: &str, uri: &str, payload: Value) -> Value
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .insert_header((AUTHORIZATION, bearer.to_owned()))
            .set_json(payload)
            .to_request();
        actix_test::read_body_json(actix_test::call_service(app, request).await).await
    }

    /// Seed a client, project and note for `user`; return the note id.
    async fn seed_note<S>(app: &S, bearer: &str) -> String
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let client = post_json(app, bearer, "/api/clients", json!({ "name": "Globex" })).await;
        let project = post_json(
            app,
            bearer,
            "/api/projects",
            json!({ "title": "Roof repair", "client": client["id"] }),
        )
        .await;
        let note = post_json(
            app,
            bearer,
            "/api/deliverynote",
            json!({
                "project": project["id"],
                "items": [{ "type": "hours", "person": "Luis", "hours": 2.5, "unitPrice": 30.0 }]
            }),
        )
        .await;
        note["id"].as_str().expect("note id").to_owned()
    }

    fn owner(harness: &TestApp) -> (User, String) {
        let user = harness.seed_user("owner@example.com");
        let bearer = harness.bearer_for(&user);
        (user, bearer)
    }

    #[actix_web::test]
    async fn sign_accepts_multipart_image() {
        let harness = TestApp::new();
        let (_, bearer) = owner(&harness);
        let app = actix_test::init_service(build_app(harness.http_state())).await;
        let id = seed_note(&app, &bearer).await;

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/deliverynote/sign/{id}"))
            .insert_header((AUTHORIZATION, bearer.clone()))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("signature", b"\x89PNG fake"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["signatureUrl"].as_str().is_some_and(|u| u.contains("sig-")));

        let details = actix_test::TestRequest::get()
            .uri(&format!("/api/deliverynote/{id}"))
            .insert_header((AUTHORIZATION, bearer))
            .to_request();
        let details: Value =
            actix_test::read_body_json(actix_test::call_service(&app, details).await).await;
        assert_eq!(details["isSigned"], true);
        assert_eq!(details["state"], "signed");
        assert_eq!(details["clientName"], "Globex");
    }

    #[actix_web::test]
    async fn sign_without_signature_field_is_rejected() {
        let harness = TestApp::new();
        let (_, bearer) = owner(&harness);
        let app = actix_test::init_service(build_app(harness.http_state())).await;
        let id = seed_note(&app, &bearer).await;

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/deliverynote/sign/{id}"))
            .insert_header((AUTHORIZATION, bearer))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("other", b"data"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["errors"]["code"], "missing_field");
        assert_eq!(harness.content.pin_attempts(), 0);
    }

    #[rstest]
    #[case::foreign_note(true, StatusCode::NOT_FOUND, "not_found")]
    #[case::own_note(false, StatusCode::BAD_REQUEST, "invalid_request")]
    #[actix_web::test]
    async fn malformed_signature_body_checks_ownership_first(
        #[case] foreign: bool,
        #[case] status: StatusCode,
        #[case] kind: &str,
    ) {
        let harness = TestApp::new();
        let (_, bearer) = owner(&harness);
        let stranger = harness.seed_user("stranger@example.com");
        let stranger = harness.bearer_for(&stranger);
        let app = actix_test::init_service(build_app(harness.http_state())).await;
        let id = seed_note(&app, &bearer).await;
        let caller = if foreign { stranger } else { bearer };

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/deliverynote/sign/{id}"))
            .insert_header((AUTHORIZATION, caller))
            .insert_header((CONTENT_TYPE, "multipart/form-data"))
            .set_payload("not a multipart body")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), status);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["kind"], kind);
        assert_eq!(harness.content.pin_attempts(), 0);
        let note_id = DeliveryNoteId::new(Uuid::parse_str(&id).expect("note id"));
        assert!(!harness.store.note(&note_id).expect("stored").is_signed);
    }

    #[actix_web::test]
    async fn pdf_is_streamed_then_redirected() {
        let harness = TestApp::new();
        let (_, bearer) = owner(&harness);
        let app = actix_test::init_service(build_app(harness.http_state())).await;
        let id = seed_note(&app, &bearer).await;

        let first = actix_test::TestRequest::get()
            .uri(&format!("/api/deliverynote/pdf/{id}"))
            .insert_header((AUTHORIZATION, bearer.clone()))
            .to_request();
        let response = actix_test::call_service(&app, first).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/pdf")
        );
        let bytes = actix_test::read_body(response).await;
        assert!(bytes.starts_with(b"%PDF"));

        let second = actix_test::TestRequest::get()
            .uri(&format!("/api/deliverynote/pdf/{id}"))
            .insert_header((AUTHORIZATION, bearer))
            .to_request();
        let response = actix_test::call_service(&app, second).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        assert!(location.is_some_and(|url| url.contains(&format!("albaran-{id}"))));
        assert_eq!(harness.renderer.render_count(), 1);
    }

    #[actix_web::test]
    async fn signed_note_cannot_be_deleted() {
        let harness = TestApp::new();
        let (_, bearer) = owner(&harness);
        let app = actix_test::init_service(build_app(harness.http_state())).await;
        let id = seed_note(&app, &bearer).await;
        let sign = actix_test::TestRequest::post()
            .uri(&format!("/api/deliverynote/sign/{id}"))
            .insert_header((AUTHORIZATION, bearer.clone()))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("signature", b"png"))
            .to_request();
        actix_test::call_service(&app, sign).await;

        let delete = actix_test::TestRequest::delete()
            .uri(&format!("/api/deliverynote/{id}"))
            .insert_header((AUTHORIZATION, bearer))
            .to_request();
        let response = actix_test::call_service(&app, delete).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["kind"], "invalid_transition");
        assert_eq!(body["errors"]["code"], "note_signed");
    }
}
