//! Driving port resolving a bearer credential to an identity.
use async_trait::async_trait;

use crate::domain::{Error, User};

/// How strictly the gate treats unvalidated identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateScope {
    /// Normal protected routes.
    Protected,
    /// The email validation route, reachable before validation.
    PendingValidation,
}

/// Verify an `Authorization` header value and return the identity it names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn authenticate(
        &self,
        authorization: Option<String>,
        scope: GateScope,
    ) -> Result<User, Error>;
}
