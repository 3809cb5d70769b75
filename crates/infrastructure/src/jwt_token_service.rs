//! HS256 JSON Web Token issuer.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rolegate_application::{IssuedToken, TokenIssuer};
use rolegate_core::{AppError, AppResult, Principal};
use serde::{Deserialize, Serialize};

/// Minimum accepted length of the shared signing secret.
pub const JWT_SECRET_MIN_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtTokenService {
    /// Creates a token service signing with `secret`.
    pub fn new(secret: &str, issuer: impl Into<String>, ttl: Duration) -> AppResult<Self> {
        if secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT secret must be at least {JWT_SECRET_MIN_LENGTH} bytes"
            )));
        }
        if ttl <= Duration::zero() {
            return Err(AppError::Validation(
                "token lifetime must be positive".to_owned(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl,
        })
    }
}

impl TokenIssuer for JwtTokenService {
    fn issue(&self, principal: &Principal) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: principal.user_id().to_string(),
            email: principal.email().to_owned(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }

    fn verify(&self, token: &str) -> AppResult<Principal> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|error| AppError::Unauthorized(format!("invalid token: {error}")))?
            .claims;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("invalid token subject".to_owned()))?;

        Ok(Principal::new(user_id, claims.email))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rolegate_application::TokenIssuer;
    use rolegate_core::{AppError, AppResult, Principal};

    use super::JwtTokenService;

    const SECRET: &str = "a-test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn issued_token_verifies_to_same_principal() -> AppResult<()> {
        let service = JwtTokenService::new(SECRET, "rolegate", Duration::hours(12))?;
        let principal = Principal::new(42, "ada@example.com");

        let token = service.issue(&principal)?;
        assert_eq!(service.verify(&token.access_token)?, principal);
        Ok(())
    }

    #[test]
    fn token_from_other_issuer_is_rejected() -> AppResult<()> {
        let ours = JwtTokenService::new(SECRET, "rolegate", Duration::hours(1))?;
        let theirs = JwtTokenService::new(SECRET, "someone-else", Duration::hours(1))?;

        let token = theirs.issue(&Principal::new(1, "eve@example.com"))?;
        assert!(matches!(
            ours.verify(&token.access_token),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() -> AppResult<()> {
        let ours = JwtTokenService::new(SECRET, "rolegate", Duration::hours(1))?;
        let forged = JwtTokenService::new(
            "another-secret-that-is-also-long-enough!!",
            "rolegate",
            Duration::hours(1),
        )?;

        let token = forged.issue(&Principal::new(1, "eve@example.com"))?;
        assert!(ours.verify(&token.access_token).is_err());
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(JwtTokenService::new("short", "rolegate", Duration::hours(1)).is_err());
    }
}
