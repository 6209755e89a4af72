//! Access-control gate composed in front of every protected handler.
//!
//! The gate is a verification function: it parses the `Authorization`
//! header, verifies the bearer credential and loads the identity it names.
//! Every failure is returned as a value; nothing here mutates the identity.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{AccessGate, GateScope, TokenError, TokenService, UserRepository};
use crate::domain::{Error, User, ValidationPolicy};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the credential from an `Authorization` header value.
pub(crate) fn bearer_credential(header: Option<&str>) -> Result<&str, Error> {
    let header = header.ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
    Ok(token)
}

fn map_token_error(error: &TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("bearer token has expired"),
        TokenError::Invalid { .. } | TokenError::Issue { .. } => {
            Error::unauthorized("bearer token is invalid")
        }
    }
}

/// Gate implementation backed by the token service and identity store.
#[derive(Clone)]
pub struct AccessGateService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
    policy: ValidationPolicy,
}

impl AccessGateService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            users,
            tokens,
            clock,
            policy,
        }
    }
}

#[async_trait]
impl AccessGate for AccessGateService {
    async fn authenticate(
        &self,
        authorization: Option<String>,
        scope: GateScope,
    ) -> Result<User, Error> {
        let token = bearer_credential(authorization.as_deref())?;
        let user_id = self
            .tokens
            .verify(token, self.clock.utc())
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                map_token_error(&err)
            })?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("user no longer exists"))?;
        if user.is_deleted {
            return Err(Error::forbidden("account has been deleted"));
        }
        if self.policy == ValidationPolicy::RequireValidated
            && scope == GateScope::Protected
            && !user.validated
        {
            return Err(Error::forbidden("email address has not been validated"));
        }
        Ok(user)
    }
}

#[cfg(test)]
#[path = "access_gate_service_tests.rs"]
mod tests;
