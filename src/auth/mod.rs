use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Session token claims. `sub` is the caller's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Claims for `user_id` expiring `expiry_hours` from now
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(AuthError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: user_id.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: None,
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token verification key configured")]
    NoKey,

    #[error("Invalid verification key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    #[error("Invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Token generation error: {0}")]
    TokenGeneration(jsonwebtoken::errors::Error),
}

/// Verifies session tokens and yields their claims.
///
/// An RSA public key (RS256) takes precedence over a shared secret (HS256).
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        let mut verifier = if let Some(pem) = &security.jwt_public_key {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(AuthError::InvalidKey)?;
            Self::new(key, Algorithm::RS256)
        } else if !security.jwt_secret.is_empty() {
            Self::hmac(&security.jwt_secret)
        } else {
            return Err(AuthError::NoKey);
        };

        if let Some(issuer) = &security.jwt_issuer {
            verifier.validation.set_issuer(&[issuer]);
            verifier.validation.set_required_spec_claims(&["exp", "iss"]);
        }

        Ok(verifier)
    }

    pub fn hmac(secret: &str) -> Self {
        Self::new(DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_nbf = true;
        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(AuthError::InvalidToken)?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(data.claims)
    }
}

/// Sign an HS256 token for `claims`. Used for development tokens and tests.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NoKey);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(AuthError::TokenGeneration)
}
