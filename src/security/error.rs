//! Security failures and how they reach the client.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every way a request can fail the security layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("no bearer token presented")]
    MissingCredential,

    #[error("invalid bearer token: {0}")]
    InvalidToken(String),

    #[error("principal lacks authority {0}")]
    Forbidden(String),

    #[error("request rejected by firewall: {0}")]
    MalformedRequestPath(String),
}

impl SecurityError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SecurityError::MissingCredential => "missing_credential",
            SecurityError::InvalidToken(_) => "invalid_token",
            SecurityError::Forbidden(_) => "forbidden",
            SecurityError::MalformedRequestPath(_) => "malformed_request_path",
        }
    }
}

/// The page denied requests are sent to.
///
/// Inserted into request extensions by the filter chain so handler-level
/// guards redirect to the same place.
#[derive(Debug, Clone)]
pub struct AccessDeniedPage(pub Arc<str>);

impl Default for AccessDeniedPage {
    fn default() -> Self {
        Self(Arc::from("/login"))
    }
}

/// A security failure bound to the response it produces.
#[derive(Debug, Clone)]
pub struct Denial {
    pub error: SecurityError,
    pub page: AccessDeniedPage,
}

impl Denial {
    pub fn new(error: SecurityError, page: AccessDeniedPage) -> Self {
        Self { error, page }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        match self.error {
            SecurityError::MalformedRequestPath(_) => {
                (StatusCode::BAD_REQUEST, "The request was rejected").into_response()
            }
            _ => redirect(&self.page.0),
        }
    }
}

/// `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
