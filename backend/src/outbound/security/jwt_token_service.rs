//! HS256 JSON Web Tokens as bearer credentials.
//!
//! Expiry is checked against the caller's clock rather than the system
//! time, so `jsonwebtoken`'s own `exp` validation is disabled.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService, token_ttl};
use crate::domain::{BearerToken, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies tokens with a shared secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    pub fn new(secret: &Zeroizing<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &UserId, issued_at: DateTime<Utc>) -> Result<BearerToken, TokenError> {
        let claims = Claims {
            sub: user.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + token_ttl()).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(BearerToken::new)
            .map_err(|err| TokenError::issue(err.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            }
        })?;
        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::expired());
        }
        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|err| TokenError::invalid(format!("subject: {err}")))?;
        Ok(UserId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use crate::domain::ports::TOKEN_TTL_SECS;

    #[fixture]
    fn service() -> JwtTokenService {
        JwtTokenService::new(&Zeroizing::new("test-secret".to_owned()))
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_733_040_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn issued_token_verifies_to_the_same_identity(service: JwtTokenService) {
        let user = UserId::random();
        let token = service.issue(&user, at(0)).expect("issue");
        assert_eq!(service.verify(&token.token, at(60)).expect("verify"), user);
    }

    #[rstest]
    #[case(TOKEN_TTL_SECS)]
    #[case(TOKEN_TTL_SECS + 1)]
    fn token_expires_after_ttl(service: JwtTokenService, #[case] elapsed: i64) {
        let token = service.issue(&UserId::random(), at(0)).expect("issue");
        let err = service.verify(&token.token, at(elapsed)).expect_err("expired");
        assert_eq!(err, TokenError::Expired);
    }

    #[rstest]
    fn token_signed_with_another_secret_is_invalid(service: JwtTokenService) {
        let other = JwtTokenService::new(&Zeroizing::new("other-secret".to_owned()));
        let token = other.issue(&UserId::random(), at(0)).expect("issue");
        let err = service.verify(&token.token, at(1)).expect_err("invalid");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }

    #[rstest]
    fn garbage_is_invalid(service: JwtTokenService) {
        let err = service.verify("not-a-jwt", at(0)).expect_err("invalid");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }
}
