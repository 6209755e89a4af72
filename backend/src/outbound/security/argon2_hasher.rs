//! Argon2id [`PasswordHasher`] running on the blocking thread pool.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use async_trait::async_trait;
use rand::rngs::OsRng;

use crate::domain::Password;
use crate::domain::ports::{HasherError, PasswordHasher};

/// Hashes with the crate's default Argon2id parameters and a random salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

fn hash_blocking(secret: &[u8]) -> Result<String, HasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret, &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| HasherError::failed(err.to_string()))
}

fn verify_blocking(secret: &[u8], stored: &str) -> Result<bool, HasherError> {
    let parsed =
        PasswordHash::new(stored).map_err(|err| HasherError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(secret, &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(err) => Err(HasherError::failed(err.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &Password) -> Result<String, HasherError> {
        let secret = password.clone();
        tokio::task::spawn_blocking(move || hash_blocking(secret.expose().as_bytes()))
            .await
            .map_err(|err| HasherError::failed(format!("hashing task: {err}")))?
    }

    async fn verify(&self, password: &Password, hash: &str) -> Result<bool, HasherError> {
        let secret = password.clone();
        let stored = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(secret.expose().as_bytes(), &stored))
            .await
            .map_err(|err| HasherError::failed(format!("verification task: {err}")))?
    }
}
