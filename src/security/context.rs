//! Per-request security context.
//!
//! The token filter inserts a `Principal` into request extensions when a
//! bearer token validates. Handlers read it through the `Authenticated`
//! extractor; its absence means the request is anonymous.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::security::error::{AccessDeniedPage, Denial, SecurityError};

/// An authenticated identity and its granted authorities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Extractor for handlers that need a principal.
///
/// Rejects with a redirect to the access-denied page when the request is
/// anonymous.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub principal: Principal,
    page: AccessDeniedPage,
}

impl Authenticated {
    /// Handler-level guard: deny unless the principal holds `authority`.
    pub fn require_authority(&self, authority: &str) -> Result<&Principal, Denial> {
        if self.principal.has_authority(authority) {
            Ok(&self.principal)
        } else {
            tracing::warn!(
                username = %self.principal.username,
                authority,
                "Access denied: missing authority"
            );
            Err(Denial::new(
                SecurityError::Forbidden(authority.to_string()),
                self.page.clone(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Denial;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let page = parts
            .extensions
            .get::<AccessDeniedPage>()
            .cloned()
            .unwrap_or_default();

        match parts.extensions.get::<Principal>() {
            Some(principal) => Ok(Self {
                principal: principal.clone(),
                page,
            }),
            None => Err(Denial::new(SecurityError::MissingCredential, page)),
        }
    }
}
