//! Bearer-token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user identifier as the sole claim,
//! valid for a fixed seven days from issuance. There is no refresh and no
//! revocation list; verification is a local signature and expiry check.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::RecordId;

/// Fixed token validity window.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// Errors raised while issuing or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token could not be issued: {message}")]
    Issue { message: String },
    #[error("token failed verification")]
    Invalid,
}

/// JWT claim set: subject (user id), issued-at, expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
///
/// Constructed once at startup from configuration and shared by reference;
/// no ambient secret lookup happens after boot.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    /// Build a signer from the configured secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `user` valid for [`TOKEN_VALIDITY_DAYS`] from `now`.
    pub fn issue(&self, user: &RecordId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|err| TokenError::Issue {
            message: err.to_string(),
        })
    }

    /// Verify `token` and return the user identifier it carries.
    ///
    /// Signature mismatches, malformed tokens, expired tokens, and claims
    /// that do not parse as a record id all collapse into
    /// [`TokenError::Invalid`]: callers deny access identically either way.
    pub fn verify(&self, token: &str) -> Result<RecordId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;
        RecordId::new(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
