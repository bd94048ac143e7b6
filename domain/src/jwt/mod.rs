//! Access tokens identifying the user behind a live connection.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the user's id. Browsers pass them
//! as the `token` query parameter since `EventSource` cannot set headers.
//!
//! # Example
//!
//! ```rust
//! use domain::jwt::{issue_access_token, verify_access_token};
//! use domain::Id;
//! use std::time::Duration;
//!
//! let user_id = Id::new_v4();
//! let token = issue_access_token(user_id, "secret", Duration::from_secs(3600)).unwrap();
//! assert_eq!(verify_access_token(&token, "secret").unwrap(), user_id);
//! ```

use crate::error::{EntityErrorKind, Error};
use entity::Id;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
}

/// Signs an access token for `user_id` valid for `ttl`.
pub fn issue_access_token(user_id: Id, secret: &str, ttl: Duration) -> Result<String, Error> {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl.as_secs(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Validates `token` (signature and expiry) and returns the user it identifies.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Id, Error> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Id::parse_str(&data.claims.sub).map_err(|e| {
        warn!("Access token subject is not a user id: {e}");
        Error {
            source: Some(Box::new(e)),
            ..Error::entity(EntityErrorKind::Unauthenticated)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    fn unauthenticated() -> DomainErrorKind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unauthenticated))
    }

    #[test]
    fn issued_tokens_verify_to_their_user() {
        let user_id = Id::new_v4();
        let token = issue_access_token(user_id, "s3cret", Duration::from_secs(60)).unwrap();

        assert_eq!(verify_access_token(&token, "s3cret").unwrap(), user_id);
    }

    #[test]
    fn a_token_signed_with_another_secret_is_rejected() {
        let token = issue_access_token(Id::new_v4(), "one", Duration::from_secs(60)).unwrap();

        let err = verify_access_token(&token, "two").unwrap_err();
        assert_eq!(err.error_kind, unauthenticated());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = verify_access_token("not-a-jwt", "s3cret").unwrap_err();
        assert_eq!(err.error_kind, unauthenticated());
    }

    #[test]
    fn an_expired_token_is_rejected() {
        let claims = AccessClaims {
            sub: Id::new_v4().to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();

        let err = verify_access_token(&token, "s3cret").unwrap_err();
        assert_eq!(err.error_kind, unauthenticated());
    }

    #[test]
    fn a_subject_that_is_not_a_uuid_is_rejected() {
        let claims = AccessClaims {
            sub: "someone".to_string(),
            iat: 0,
            exp: chrono::Utc::now().timestamp() as u64 + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();

        let err = verify_access_token(&token, "s3cret").unwrap_err();
        assert_eq!(err.error_kind, unauthenticated());
    }
}
