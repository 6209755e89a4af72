//! Port for issuing and verifying bearer credentials.
use chrono::{DateTime, Duration, Utc};

use super::define_port_error;
use crate::domain::{BearerToken, UserId};

/// Lifetime of every issued bearer credential, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// [`TOKEN_TTL_SECS`] as a duration.
#[must_use]
pub fn token_ttl() -> Duration {
    Duration::seconds(TOKEN_TTL_SECS)
}

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Signature, encoding or claims are invalid.
        Invalid { message: String } => "bearer token is invalid: {message}",
        /// The token is well formed but past its expiry.
        Expired => "bearer token has expired",
        /// A token could not be produced.
        Issue { message: String } => "bearer token could not be issued: {message}",
    }
}

/// Signs identity claims. Time is passed in so callers control the clock.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a credential for `user` valid for [`token_ttl`] from `issued_at`.
    fn issue(&self, user: &UserId, issued_at: DateTime<Utc>) -> Result<BearerToken, TokenError>;

    /// Verify signature and expiry at `now`, returning the embedded identity.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError>;
}
