//! One-time code and token generation.
//!
//! Reset tokens and invite codes come from the operating system CSPRNG. The
//! short email validation code uses a fast non-cryptographic generator; it is
//! guessable in principle and only protected by being single use.

use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};

/// Length of the human-typed validation code.
pub const VALIDATION_CODE_LEN: usize = 6;
/// Random bytes in a password reset token.
pub const RESET_TOKEN_BYTES: usize = 32;
/// Random bytes in an invite code.
pub const INVITE_CODE_BYTES: usize = 16;

const VALIDATION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a short uppercase alphanumeric validation code.
#[must_use]
pub fn validation_code() -> String {
    let mut rng = SmallRng::from_entropy();
    (0..VALIDATION_CODE_LEN)
        .map(|_| {
            let index = rng.gen_range(0..VALIDATION_ALPHABET.len());
            char::from(VALIDATION_ALPHABET[index])
        })
        .collect()
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a hex-encoded password reset token.
#[must_use]
pub fn reset_token() -> String {
    random_hex(RESET_TOKEN_BYTES)
}

/// Generate a hex-encoded invitation code.
#[must_use]
pub fn invite_code() -> String {
    random_hex(INVITE_CODE_BYTES)
}

/// SHA-256 digest of a token, hex encoded. Stored in place of the token.
#[must_use]
pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn validation_code_is_short_uppercase_alphanumeric() {
        let code = validation_code();
        assert_eq!(code.len(), VALIDATION_CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[rstest]
    #[case(reset_token(), RESET_TOKEN_BYTES * 2)]
    #[case(invite_code(), INVITE_CODE_BYTES * 2)]
    fn random_tokens_are_hex(#[case] token: String, #[case] expected_len: usize) {
        assert_eq!(token.len(), expected_len);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn reset_tokens_differ() {
        assert_ne!(reset_token(), reset_token());
    }

    #[rstest]
    fn digest_is_stable_and_hides_input() {
        let digest = digest_token("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest, digest_token("abc"));
    }
}
