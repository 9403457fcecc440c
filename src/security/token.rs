//! Bearer token issuance and validation.
//!
//! # Responsibilities
//! - Resolve the bearer token from the `Authorization` header
//! - Validate signature and expiry, producing a `Principal`
//! - Issue tokens for principals after a successful login
//!
//! # Design Decisions
//! - HS256 with a shared secret from configuration
//! - Validation is stateless: the same token and clock give the same result
//! - No leeway on expiry

use std::fmt::Debug;

use axum::http::{header, HeaderMap};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey,
    EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::security::context::Principal;
use crate::security::error::SecurityError;

const BEARER_PREFIX: &str = "Bearer ";

/// Error returned when a token cannot be issued.
#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// Issues and validates bearer tokens.
pub trait TokenProvider: Send + Sync + Debug {
    /// Extract the raw token from request headers.
    fn resolve_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
    }

    /// Validate a token and return the principal it names.
    fn validate(&self, token: &str) -> Result<Principal, SecurityError>;

    /// Issue a token for `principal`.
    fn create_token(&self, principal: &Principal) -> Result<String, TokenError>;
}

/// Claims carried by issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub auth: Vec<String>,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// HS256 JSON Web Token provider.
pub struct JwtTokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity_secs: u64,
}

impl Debug for JwtTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenProvider")
            .field("validity_secs", &self.validity_secs)
            .finish_non_exhaustive()
    }
}

impl JwtTokenProvider {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            validity_secs: config.validity_secs,
        }
    }

    /// Issue a token as if the current time were `issued_at` (unix seconds).
    pub fn create_token_at(
        &self,
        principal: &Principal,
        issued_at: u64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: principal.username.clone(),
            auth: principal.authorities.clone(),
            iat: issued_at,
            exp: issued_at + self.validity_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

impl TokenProvider for JwtTokenProvider {
    fn validate(&self, token: &str) -> Result<Principal, SecurityError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "expired",
                ErrorKind::InvalidSignature => "bad signature",
                ErrorKind::MissingRequiredClaim(_) => "missing claim",
                _ => "malformed",
            };
            SecurityError::InvalidToken(reason.to_string())
        })?;

        if data.claims.sub.is_empty() {
            return Err(SecurityError::InvalidToken("missing claim".to_string()));
        }

        Ok(Principal::new(data.claims.sub, data.claims.auth))
    }

    fn create_token(&self, principal: &Principal) -> Result<String, TokenError> {
        self.create_token_at(principal, get_current_timestamp())
    }
}
