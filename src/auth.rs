//! Token-based authentication.
//!
//! Login issues an HS256-signed token whose subject is the user id; every
//! entity route derives its owner scope from the `Authorization: Bearer`
//! header rather than trusting a client-supplied user id.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::User;
use crate::state::AppState;
use crate::{Error, Result};

const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by an issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i64,
    /// Email
    pub email: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a token (with or without the `Bearer ` prefix) and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| Error::Auth(format!("Invalid token: {e}")))
    }
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Auth("Missing authorization header.".to_string()))?;

        let claims = state.auth.verify(header)?;
        Ok(CurrentUser { id: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "pw".to_string(),
            birth_date: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn issued_token_verifies_round_trip() {
        let keys = AuthKeys::new("unit-test-secret");
        let token = keys.issue(&sample_user()).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "test@example.com");

        // Bearer prefix is accepted too.
        let claims = keys.verify(&format!("Bearer {token}")).unwrap();
        assert_eq!(claims.sub, 7);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = AuthKeys::new("one-secret").issue(&sample_user()).unwrap();
        let err = AuthKeys::new("another-secret").verify(&token).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = AuthKeys::new("unit-test-secret");
        assert!(keys.verify("Bearer not.a.token").is_err());
    }
}
