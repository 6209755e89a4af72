//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into one JSON envelope:
//!
//! ```json
//! {"status":"error","code":404,"kind":"not_found","message":"…","traceId":"…"}
//! ```
//!
//! Extractor failures (malformed JSON, malformed path identifiers, broken
//! multipart bodies) are routed through the same envelope.

use actix_multipart::form::MultipartFormConfig;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

/// Wire shape of every error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    #[schema(example = "error")]
    pub status: String,
    /// HTTP status code, repeated in the body.
    #[schema(example = 404)]
    pub code: u16,
    /// Machine-readable error kind.
    pub kind: ErrorCode,
    /// Human-readable message.
    #[schema(example = "client 3fa85f64-5717-4562-b3fc-2c963f66afa6 not found")]
    pub message: String,
    /// Field-level or reason details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    /// Correlation identifier of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorEnvelope {
    fn from_error(error: &Error) -> Self {
        let status = status_for(error.code());
        let redacted = matches!(error.code(), ErrorCode::InternalError);
        Self {
            status: "error".to_owned(),
            code: status.as_u16(),
            kind: error.code(),
            message: if redacted {
                REDACTED_MESSAGE.to_owned()
            } else {
                error.message().to_owned()
            },
            errors: if redacted {
                None
            } else {
                error.details().cloned()
            },
            trace_id: error.trace_id().map(str::to_owned),
        }
    }
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::InvalidTransition => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::UploadFailed | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(message = %self.message(), details = ?self.details(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorEnvelope::from_error(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(REDACTED_MESSAGE)
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match &err {
        JsonPayloadError::ContentType => {
            Error::invalid_request("request body must be application/json")
                .with_details(json!({ "code": "unsupported_content_type" }))
        }
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            Error::invalid_request("request body is too large")
                .with_details(json!({ "code": "payload_too_large" }))
        }
        JsonPayloadError::Deserialize(inner) => {
            Error::invalid_request(format!("malformed request body: {inner}"))
                .with_details(json!({ "code": "malformed_body" }))
        }
        other => Error::invalid_request(format!("malformed request body: {other}"))
            .with_details(json!({ "code": "malformed_body" })),
    };
    warn!(error = %err, "rejected request body");
    error.into()
}

fn path_error(err: PathError, req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, path = %req.path(), "unparseable path identifier");
    Error::not_found("resource not found").into()
}

fn multipart_error(err: actix_multipart::MultipartError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected multipart body");
    Error::invalid_request(format!("malformed multipart body: {err}"))
        .with_details(json!({ "code": "malformed_body" }))
        .into()
}

/// JSON extractor configuration producing the error envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Path extractor configuration: unparseable identifiers read as missing
/// resources.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error)
}

/// Multipart form configuration for signature uploads.
#[must_use]
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(SIGNATURE_BODY_LIMIT)
        .memory_limit(SIGNATURE_BODY_LIMIT)
        .error_handler(multipart_error)
}

/// Upper bound on a signature upload body.
pub const SIGNATURE_BODY_LIMIT: usize = 5 * 1024 * 1024;

#[cfg(test)]
mod tests;
