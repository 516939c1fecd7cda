//! Bearer-token authentication
//!
//! Tokens are HS256 JWTs carrying the subject and its staff flags. A request
//! without an `Authorization` header is anonymous; a header that cannot be
//! decoded is rejected.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Identity;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: usize,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            subject: claims.sub,
            is_staff: claims.is_staff,
            is_superuser: claims.is_superuser,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid Authorization header format")]
    MalformedHeader,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Could not sign token: {0}")]
    Signing(String),
}

pub fn create_jwt(
    secret: &str,
    subject: &str,
    is_staff: bool,
    is_superuser: bool,
    ttl_hours: i64,
) -> Result<String, AuthError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AuthError::Signing("expiration out of range".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: subject.to_owned(),
        is_staff,
        is_superuser,
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

pub fn decode_jwt(secret: &str, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Resolves the caller from the `Authorization: Bearer <token>` header.
pub fn identity_from_headers(
    headers: &HeaderMap,
    secret: &str,
) -> Result<Option<Identity>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedHeader)?;

    decode_jwt(secret, token).map(|claims| Some(claims.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_round_trip_keeps_flags() {
        let token = create_jwt("s3cret", "librarian", true, false, 1).unwrap();
        let claims = decode_jwt("s3cret", &token).unwrap();
        assert_eq!(claims.sub, "librarian");
        assert!(claims.is_staff);
        assert!(!claims.is_superuser);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_jwt("s3cret", "librarian", true, false, 1).unwrap();
        assert!(matches!(
            decode_jwt("other", &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_jwt("s3cret", "librarian", true, false, -2).unwrap();
        assert!(decode_jwt("s3cret", &token).is_err());
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let headers = HeaderMap::new();
        assert!(identity_from_headers(&headers, "s3cret").unwrap().is_none());
    }

    #[test]
    fn test_non_bearer_header_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(matches!(
            identity_from_headers(&headers, "s3cret"),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn test_bearer_header_yields_identity() {
        let token = create_jwt("s3cret", "admin", false, true, 1).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        let identity = identity_from_headers(&headers, "s3cret").unwrap().unwrap();
        assert_eq!(identity.subject, "admin");
        assert!(identity.is_privileged());
    }
}
