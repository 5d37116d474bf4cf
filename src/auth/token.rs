//! JWT access tokens.
//!
//! Tokens are HS256-signed and carry only registered claims. Expiry is
//! exclusive: a token presented at exactly its `exp` instant is already
//! invalid. jsonwebtoken's built-in expiry check is inclusive and applies
//! leeway, so validation disables it and compares timestamps itself.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{Error, Result},
    types::UserId,
};

pub const TOKEN_ISSUER: &str = "perch";

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    /// User id, as a hyphenated UUID string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a new access token for `user_id`, valid for `ttl` from now.
pub fn issue_token(user_id: UserId, secret: &str, ttl: Duration) -> Result<String> {
    if user_id.is_nil() {
        return Err(Error::BadRequest {
            message: "cannot issue a token for the nil user id".to_string(),
        });
    }
    if secret.is_empty() {
        return Err(Error::BadRequest {
            message: "signing secret must not be empty".to_string(),
        });
    }

    let now = Utc::now();
    let claims = AccessTokenClaims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| Error::Internal {
            operation: format!("sign access token: {e}"),
        })
}

/// Verify a token's signature, issuer and expiry, and return the user id it
/// was issued to. Every failure mode maps to an unauthenticated error.
pub fn validate_token(token: &str, secret: &str) -> Result<UserId> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Expiry is checked below with an exclusive boundary and no leeway.
    validation.validate_exp = false;

    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthenticated { message: None })?;

    if Utc::now().timestamp() >= data.claims.exp {
        return Err(Error::Unauthenticated {
            message: Some("token expired".to_string()),
        });
    }

    Uuid::parse_str(&data.claims.sub).map_err(|_| Error::Unauthenticated { message: None })
}
