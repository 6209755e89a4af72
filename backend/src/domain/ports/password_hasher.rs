//! Port for one-way password hashing.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Password;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum HasherError {
        /// Hashing or verification could not run.
        Failed { message: String } => "password hashing failed: {message}",
        /// The stored hash is not in a recognised format.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hash and verify secrets. Implementations may be CPU heavy and should keep
/// that work off the async executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing hash string (algorithm, salt, digest).
    async fn hash(&self, password: &Password) -> Result<String, HasherError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    async fn verify(&self, password: &Password, hash: &str) -> Result<bool, HasherError>;
}
