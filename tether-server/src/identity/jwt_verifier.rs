//! HS256 JWT credentials.
//!
//! Tokens carry the user id in `sub` and an `exp` expiry. They are signed
//! with a secret shared with the service that issues them.

use crate::identity::{AuthError, IdentityVerifier};
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tether_core::SubjectId;
use tracing::debug;

/// Tokens above this size are refused before any decoding work.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Value,
    exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<u64>,
}

pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// `leeway_secs` is the clock skew tolerated when checking `exp`.
    pub fn new(secret: &[u8], leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    fn verify_token(&self, token: &str) -> Result<SubjectId, AuthError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            debug!("Rejecting oversized token ({} bytes)", token.len());
            return Err(AuthError::InvalidCredential);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token verification failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::CredentialExpired,
                _ => AuthError::InvalidCredential,
            }
        })?;

        subject_from_claim(data.claims.sub)
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, credential: &str) -> Result<SubjectId, AuthError> {
        self.verify_token(credential)
    }
}

fn subject_from_claim(sub: Value) -> Result<SubjectId, AuthError> {
    match sub {
        Value::String(s) if !s.is_empty() => Ok(SubjectId(s)),
        Value::Number(n) => Ok(SubjectId(n.to_string())),
        _ => Err(AuthError::InvalidCredential),
    }
}

/// Sign a token for `subject` that expires at the unix timestamp `exp`.
pub fn issue_token(
    secret: &[u8],
    subject: &str,
    exp: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: Value::String(subject.to_string()),
        exp,
        iat: Some(get_current_timestamp()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Sign a token for `subject` valid for `ttl` from now.
pub fn mint_token(
    secret: &[u8],
    subject: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue_token(secret, subject, get_current_timestamp() + ttl.as_secs())
}
