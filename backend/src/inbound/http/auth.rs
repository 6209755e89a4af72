//! Bearer-token extractors used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by resolving the
//! caller here. Each extractor hands the `Authorization` header to the
//! [`AccessGate`](crate::domain::ports::AccessGate) port and yields the
//! resolved identity as an immutable value.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::GateScope;
use crate::domain::{Error, User};
use crate::inbound::http::state::HttpState;

fn resolve(req: &HttpRequest, scope: GateScope) -> LocalBoxFuture<'static, Result<User, Error>> {
    let state = req.app_data::<web::Data<HttpState>>().cloned();
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    Box::pin(async move {
        let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
        let user = state.gate.authenticate(header, scope).await?;
        debug!(user_id = %user.id, "request authenticated");
        Ok(user)
    })
}

/// Identity behind a valid bearer token on a protected route.
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let fut = resolve(req, GateScope::Protected);
        Box::pin(async move { fut.await.map(Self).map_err(Into::into) })
    }
}

/// Identity behind a valid bearer token that may not have validated its
/// email yet. Only the validation route uses it.
#[derive(Debug, Clone)]
pub struct PendingValidation(pub User);

impl FromRequest for PendingValidation {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let fut = resolve(req, GateScope::PendingValidation);
        Box::pin(async move { fut.await.map(Self).map_err(Into::into) })
    }
}
